#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use gas_gauge::{
    config::AppConfig,
    db,
    entities::{canister, canister_type},
    services::{
        gauge::{CreateCanister, CreateCanisterType, CreateWeighing},
        seed, GaugeService,
    },
    AppState,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

/// Application state over a fresh SQLite file that lives as long as the harness.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _data_dir: TempDir,
}

impl TestApp {
    /// Migrated, empty database.
    pub async fn new() -> Self {
        let data_dir = TempDir::new().expect("create temp dir for test database");
        let db_path = data_dir.path().join("gas_gauge_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            "127.0.0.1".to_string(),
            18_000,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.seed_on_startup = false;
        cfg.static_dir = format!("{}/static", env!("CARGO_MANIFEST_DIR"));

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = gas_gauge::app_router(state.clone());

        Self {
            router,
            state,
            _data_dir: data_dir,
        }
    }

    /// Migrated database holding the predefined canister types.
    pub async fn seeded() -> Self {
        let app = Self::new().await;
        seed::seed_canister_types(app.service().canister_types())
            .await
            .expect("seed canister types");
        app
    }

    pub fn service(&self) -> &GaugeService {
        self.state.gauge_service()
    }

    pub async fn create_type(&self, name: &str, full: i32, empty: i32) -> canister_type::Model {
        self.service()
            .create_canister_type(CreateCanisterType {
                name: name.to_string(),
                full_weight: full,
                empty_weight: empty,
            })
            .await
            .expect("create canister type")
    }

    pub async fn create_canister(&self, label: &str, type_id: i32) -> canister::Model {
        self.service()
            .create_canister(CreateCanister {
                label: label.to_string(),
                canister_type_id: type_id,
            })
            .await
            .expect("create canister")
    }

    pub async fn weigh(&self, canister_id: &str, weight: i32, recorded_at: &str) {
        self.service()
            .create_weighing(
                canister_id,
                CreateWeighing {
                    weight,
                    recorded_at: Some(recorded_at.to_string()),
                    comment: None,
                },
            )
            .await
            .expect("create weighing");
    }

    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
    }

    /// POST with an `application/x-www-form-urlencoded` body.
    pub async fn post_form(&self, uri: &str, form: &str) -> Response {
        self.request(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .expect("failed to build request"),
        )
        .await
    }

    pub async fn send_json(&self, method: Method, uri: &str, body: Value) -> Response {
        self.request(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::to_vec(&body).expect("failed to serialize json request body"),
                ))
                .expect("failed to build request"),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
    }
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 response body")
}

pub async fn body_json(response: Response) -> Value {
    let text = body_text(response).await;
    serde_json::from_str(&text).expect("json response body")
}

pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect carries a location header")
}
