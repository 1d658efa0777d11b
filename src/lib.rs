//! Gas Gauge
//!
//! Tracks the fuel left in refillable camping-gas canisters from periodic
//! weighings against each canister type's full and empty reference weights.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod calculations;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod repositories;
pub mod services;
pub mod tracing;
pub mod views;

use axum::{
    response::Json,
    routing::{delete, get, patch, post},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tower_http::services::ServeDir;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub gauge: services::GaugeService,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        Self {
            gauge: services::GaugeService::new(db.clone()),
            db,
            config,
        }
    }

    pub fn gauge_service(&self) -> &services::GaugeService {
        &self.gauge
    }
}

// Common response wrappers
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message),
            meta: Some(ResponseMeta::capture()),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Server-rendered pages and their form targets
pub fn page_routes() -> Router<AppState> {
    use handlers::pages;

    Router::new()
        .route("/", get(pages::dashboard))
        .route("/canister/create", post(pages::create_canister))
        .route("/canister/:id", get(pages::canister_detail))
        .route("/canister/:id/add-weighing", post(pages::add_weighing))
        .route("/canister/:id/mark-depleted", post(pages::mark_depleted))
        .route("/canister/:id/reactivate", post(pages::reactivate))
        .route("/canister/:id/delete", post(pages::delete_canister))
        .route("/canister/:id/update-label", post(pages::update_label))
        .route("/weighing/:id/delete", post(pages::delete_weighing))
        .route("/types", get(pages::types))
        .route("/admin/types", get(pages::types))
        .route("/types/create", post(pages::create_type))
        .route("/types/:id/delete", post(pages::delete_type))
}

/// JSON endpoints under `/api`
pub fn api_routes() -> Router<AppState> {
    use handlers::api;

    Router::new()
        .route("/cheatsheet/:type_id", get(api::cheat_sheet))
        .route(
            "/canister-types",
            get(api::list_canister_types).post(api::create_canister_type),
        )
        .route("/canister-types/:id", delete(api::delete_canister_type))
        .route(
            "/canisters",
            get(api::list_canisters).post(api::create_canister),
        )
        .route("/canisters/:id", get(api::get_canister))
        .route("/canisters/:id/status", patch(api::update_canister_status))
        .route("/canisters/:id/detail", get(api::canister_detail))
        .route(
            "/weighings",
            get(api::list_weighings).post(api::create_weighing),
        )
}

/// The full application with static files, tracing and request ids.
pub fn app_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.static_dir);

    Router::new()
        .merge(page_routes())
        .nest("/api", api_routes())
        .route("/health", get(handlers::api::health_check))
        .nest_service("/static", static_dir)
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

#[cfg(test)]
mod response_tests {
    use super::*;
    use chrono::DateTime;

    #[tokio::test]
    async fn success_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-123"), async {
                ApiResponse::success("ok")
            })
            .await;

        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-123"));
        DateTime::parse_from_rfc3339(&meta.timestamp).expect("timestamp should parse");
    }

    #[tokio::test]
    async fn error_response_includes_request_metadata() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("meta-err"), async {
                ApiResponse::<()>::error("oops".into())
            })
            .await;

        assert!(!response.success);
        let meta = response.meta.expect("metadata expected");
        assert_eq!(meta.request_id.as_deref(), Some("meta-err"));
        assert!(!meta.timestamp.is_empty());
    }
}
