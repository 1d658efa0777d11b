use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://./data/gas_gauge.db?mode=rwc";
const DEFAULT_STATIC_DIR: &str = "static";
const CONFIG_DIR: &str = "config";

/// Legacy variable naming the SQLite file directly.
const DATABASE_PATH_VAR: &str = "DATABASE_PATH";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
#[validate(schema(function = "validate_pool_bounds", skip_on_field_errors = false))]
pub struct AppConfig {
    /// Database connection URL (SQLite only)
    #[validate(custom = "validate_sqlite_url")]
    pub database_url: String,

    /// Server host address
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default = "default_true_bool")]
    pub auto_migrate: bool,

    /// Whether to create the predefined canister types on startup
    #[serde(default = "default_true_bool")]
    pub seed_on_startup: bool,

    /// Directory served under `/static`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    #[validate(range(min = 1))]
    pub db_min_connections: u32,

    /// DB pool: connect timeout (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    /// DB pool: acquire timeout (seconds)
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// DB pool: idle timeout (seconds)
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
}

impl AppConfig {
    /// Gets database URL reference
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Creates a configuration with defaults for everything but the
    /// connection and bind address.
    pub fn new(database_url: String, host: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            host,
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: true,
            seed_on_startup: true,
            static_dir: default_static_dir(),
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            db_acquire_timeout_secs: default_db_acquire_timeout_secs(),
            db_idle_timeout_secs: default_db_idle_timeout_secs(),
        }
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Extracts the file path from a `sqlite:` URL.
pub fn sqlite_file_path(url: &str) -> Option<PathBuf> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };

    if path.is_empty() || path == ":memory:" {
        return None;
    }
    if query.map_or(false, |q| q.split('&').any(|kv| kv == "mode=memory")) {
        return None;
    }
    Some(PathBuf::from(path))
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_static_dir() -> String {
    DEFAULT_STATIC_DIR.to_string()
}

fn default_db_max_connections() -> u32 {
    5
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_db_acquire_timeout_secs() -> u64 {
    8
}
fn default_db_idle_timeout_secs() -> u64 {
    600
}

fn default_true_bool() -> bool {
    true
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

fn validate_sqlite_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with("sqlite:") {
        Ok(())
    } else {
        let mut err = ValidationError::new("database_url");
        err.message = Some("Only sqlite: database URLs are supported".into());
        Err(err)
    }
}

fn validate_pool_bounds(config: &AppConfig) -> Result<(), ValidationError> {
    if config.db_max_connections < config.db_min_connections {
        let mut err = ValidationError::new("db_max_connections");
        err.message = Some("db_max_connections must be >= db_min_connections".into());
        return Err(err);
    }
    Ok(())
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("gas_gauge={},tower_http=info", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    // try_init so repeated calls (tests, admin CLI) do not panic
    if json {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .json()
            .try_init();
    } else {
        let _ = fmt()
            .with_env_filter(EnvFilter::new(filter_directive))
            .try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
/// 5. `DATABASE_PATH`, if set, replaces the database URL
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    // Support both RUN_ENV and APP_ENV for selecting config profile
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let mut builder = Config::builder()
        .set_default("database_url", DEFAULT_DATABASE_URL)?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", run_env.as_str())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    if let Some(path) = env::var(DATABASE_PATH_VAR)
        .ok()
        .filter(|p| !p.trim().is_empty())
    {
        info!("Using database file from {}: {}", DATABASE_PATH_VAR, path);
        builder = builder.set_override("database_url", format!("sqlite://{}?mode=rwc", path))?;
    }

    let app_config: AppConfig = builder.build()?.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    const LOADER_VARS: [&str; 5] = [
        DATABASE_PATH_VAR,
        "APP__PORT",
        "APP__LOG_LEVEL",
        "RUN_ENV",
        "APP_ENV",
    ];

    /// Holds the env lock and clears the variables `load_config` reads, before and after.
    struct EnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
    }

    impl EnvGuard {
        fn acquire() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            for var in LOADER_VARS {
                env::remove_var(var);
            }
            Self { _lock: lock }
        }

        fn set(&self, key: &str, value: &str) {
            env::set_var(key, value);
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for var in LOADER_VARS {
                env::remove_var(var);
            }
        }
    }

    fn base_config() -> AppConfig {
        AppConfig::new(
            DEFAULT_DATABASE_URL.into(),
            "127.0.0.1".into(),
            8000,
            "development".into(),
        )
    }

    #[test]
    fn defaults_pass_validation() {
        let cfg = base_config();
        assert!(cfg.validate().is_ok());
        assert!(cfg.auto_migrate);
        assert!(cfg.seed_on_startup);
        assert_eq!(cfg.bind_address(), "127.0.0.1:8000");
    }

    #[test]
    fn rejects_unknown_log_level() {
        let mut cfg = base_config();
        cfg.log_level = "verbose".into();
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("log_level"));
    }

    #[test]
    fn rejects_non_sqlite_urls() {
        let mut cfg = base_config();
        cfg.database_url = "postgres://localhost/gauge".into();
        let errors = cfg.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("database_url"));
    }

    #[test]
    fn rejects_inverted_pool_bounds() {
        let mut cfg = base_config();
        cfg.db_min_connections = 4;
        cfg.db_max_connections = 2;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn database_path_overrides_the_url() {
        let env = EnvGuard::acquire();
        let path = "/tmp/gauge-config-test/gauge.db";
        env.set(DATABASE_PATH_VAR, path);

        let cfg = load_config().expect("config loads");
        assert_eq!(cfg.database_url, format!("sqlite://{}?mode=rwc", path));
    }

    #[test]
    fn blank_database_path_is_ignored() {
        let env = EnvGuard::acquire();
        env.set(DATABASE_PATH_VAR, "   ");

        let cfg = load_config().expect("config loads");
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn app_port_variable_overrides_file_value() {
        let env = EnvGuard::acquire();
        env.set("APP__PORT", "9123");

        let cfg = load_config().expect("config loads");
        assert_eq!(cfg.port, 9123);
        assert_eq!(cfg.environment, DEFAULT_ENV);
    }

    #[test]
    fn invalid_log_level_variable_fails_validation() {
        let env = EnvGuard::acquire();
        env.set("APP__LOG_LEVEL", "verbose");

        let result = load_config();
        assert!(
            matches!(result, Err(AppConfigError::Validation(_))),
            "expected validation error, got {:?}",
            result
        );
    }

    #[test]
    fn sqlite_file_path_handles_common_forms() {
        assert_eq!(
            sqlite_file_path("sqlite://./data/gas_gauge.db?mode=rwc"),
            Some(PathBuf::from("./data/gas_gauge.db"))
        );
        assert_eq!(
            sqlite_file_path("sqlite:/var/lib/gauge.db"),
            Some(PathBuf::from("/var/lib/gauge.db"))
        );
        assert_eq!(sqlite_file_path("sqlite::memory:"), None);
        assert_eq!(sqlite_file_path("sqlite://gauge.db?mode=memory"), None);
        assert_eq!(sqlite_file_path("postgres://x"), None);
    }
}
