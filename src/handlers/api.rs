use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use validator::Validate;

use super::common::{created_response, success_response};
use crate::{
    entities::{canister, canister::CanisterStatus, canister_type},
    errors::ServiceError,
    services::gauge::{
        CanisterDetail, CheatSheet, CreateCanister, CreateCanisterType, CreateWeighing,
        WeighingReading,
    },
    ApiResponse, ApiResult, AppState,
};

#[derive(Debug, Deserialize, Default)]
pub struct CanisterListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WeighingListQuery {
    pub canister_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateWeighingRequest {
    #[validate(length(min = 1, message = "canister_id is required"))]
    pub canister_id: String,
    pub weight: i32,
    #[serde(default)]
    pub recorded_at: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

fn parse_status(raw: &str) -> Result<CanisterStatus, ServiceError> {
    CanisterStatus::from_str(raw.trim()).map_err(|_| {
        ServiceError::ValidationError(format!(
            "Invalid status '{}': expected 'active' or 'depleted'",
            raw
        ))
    })
}

/// GET /api/canister-types
pub async fn list_canister_types(
    State(state): State<AppState>,
) -> ApiResult<Vec<canister_type::Model>> {
    let types = state.gauge_service().list_canister_types().await?;
    Ok(Json(ApiResponse::success(types)))
}

/// POST /api/canister-types
pub async fn create_canister_type(
    State(state): State<AppState>,
    Json(payload): Json<CreateCanisterType>,
) -> Result<Response, ServiceError> {
    let created = state.gauge_service().create_canister_type(payload).await?;
    Ok(created_response(created))
}

/// DELETE /api/canister-types/:id
pub async fn delete_canister_type(
    State(state): State<AppState>,
    Path(type_id): Path<i32>,
) -> ApiResult<canister_type::Model> {
    let deleted = state.gauge_service().delete_canister_type(type_id).await?;
    Ok(Json(ApiResponse::success(deleted)))
}

/// GET /api/canisters?status=active|depleted
pub async fn list_canisters(
    State(state): State<AppState>,
    Query(query): Query<CanisterListQuery>,
) -> ApiResult<Vec<canister::Model>> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(parse_status)
        .transpose()?;
    let canisters = state.gauge_service().list_canisters(status).await?;
    Ok(Json(ApiResponse::success(canisters)))
}

/// POST /api/canisters
pub async fn create_canister(
    State(state): State<AppState>,
    Json(payload): Json<CreateCanister>,
) -> Result<Response, ServiceError> {
    let created = state.gauge_service().create_canister(payload).await?;
    Ok(created_response(created))
}

/// GET /api/canisters/:id
pub async fn get_canister(
    State(state): State<AppState>,
    Path(canister_id): Path<String>,
) -> ApiResult<canister::Model> {
    let canister = state.gauge_service().get_canister(&canister_id).await?;
    Ok(Json(ApiResponse::success(canister)))
}

/// PATCH /api/canisters/:id/status
pub async fn update_canister_status(
    State(state): State<AppState>,
    Path(canister_id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> ApiResult<canister::Model> {
    let status = parse_status(&payload.status)?;
    let updated = state
        .gauge_service()
        .set_status(&canister_id, status)
        .await?;
    Ok(Json(ApiResponse::success(updated)))
}

/// GET /api/canisters/:id/detail, the data behind the history chart
pub async fn canister_detail(
    State(state): State<AppState>,
    Path(canister_id): Path<String>,
) -> ApiResult<CanisterDetail> {
    let detail = state
        .gauge_service()
        .canister_detail_view(&canister_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Canister {} not found", canister_id)))?;
    Ok(Json(ApiResponse::success(detail)))
}

/// GET /api/weighings?canister_id=...
pub async fn list_weighings(
    State(state): State<AppState>,
    Query(query): Query<WeighingListQuery>,
) -> ApiResult<Vec<WeighingReading>> {
    let weighings = state
        .gauge_service()
        .list_weighings(query.canister_id.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(weighings)))
}

/// POST /api/weighings
pub async fn create_weighing(
    State(state): State<AppState>,
    Json(payload): Json<CreateWeighingRequest>,
) -> Result<Response, ServiceError> {
    payload.validate()?;
    let service = state.gauge_service();
    let created = service
        .create_weighing(
            &payload.canister_id,
            CreateWeighing {
                weight: payload.weight,
                recorded_at: payload.recorded_at,
                comment: payload.comment,
            },
        )
        .await?;

    let reading = service
        .list_weighings(Some(&created.canister_id))
        .await?
        .into_iter()
        .find(|w| w.weighing.id == created.id)
        .ok_or_else(|| {
            ServiceError::InternalError(format!("Weighing {} vanished after insert", created.id))
        })?;
    Ok(created_response(reading))
}

/// GET /api/cheatsheet/:type_id. Unwrapped, the page script reads it directly.
pub async fn cheat_sheet(
    State(state): State<AppState>,
    Path(type_id): Path<i32>,
) -> Result<Json<CheatSheet>, ServiceError> {
    Ok(Json(state.gauge_service().cheat_sheet(type_id).await?))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Response {
    let (status, db_status) = match crate::db::check_connection(&state.db).await {
        Ok(()) => (StatusCode::OK, "healthy"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy"),
    };

    let health_data: Value = json!({
        "status": db_status,
        "checks": { "database": db_status },
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
    });

    if status.is_success() {
        success_response(health_data)
    } else {
        (status, Json(ApiResponse::<Value>::error(db_status.to_string()))).into_response()
    }
}
