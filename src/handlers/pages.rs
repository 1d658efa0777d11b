use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use tracing::{error, warn};

use super::common::redirect_to_canister;
use crate::{
    errors::{PageError, ServiceError},
    services::gauge::{CreateCanister, CreateCanisterType, CreateWeighing, UpdateLabel},
    views, AppState,
};

type PageResult<T> = Result<T, PageError>;

/// GET /
pub async fn dashboard(State(state): State<AppState>) -> PageResult<Html<String>> {
    let view = state.gauge_service().dashboard_view().await?;
    Ok(views::dashboard_page(&view))
}

/// GET /canister/:id. Unknown ids go back to the dashboard.
pub async fn canister_detail(
    State(state): State<AppState>,
    Path(canister_id): Path<String>,
) -> PageResult<Response> {
    match state
        .gauge_service()
        .canister_detail_view(&canister_id)
        .await?
    {
        Some(detail) => Ok(views::detail_page(&detail).into_response()),
        None => Ok(Redirect::to("/").into_response()),
    }
}

/// GET /types and /admin/types
pub async fn types(State(state): State<AppState>) -> PageResult<Html<String>> {
    let types = state.gauge_service().list_canister_types().await?;
    Ok(views::types_page(&types))
}

/// POST /canister/create
pub async fn create_canister(
    State(state): State<AppState>,
    Form(form): Form<CreateCanister>,
) -> PageResult<Redirect> {
    state.gauge_service().create_canister(form).await?;
    Ok(Redirect::to("/"))
}

/// POST /canister/:id/add-weighing
pub async fn add_weighing(
    State(state): State<AppState>,
    Path(canister_id): Path<String>,
    Form(form): Form<CreateWeighing>,
) -> PageResult<Redirect> {
    state
        .gauge_service()
        .create_weighing(&canister_id, form)
        .await?;
    Ok(redirect_to_canister(&canister_id))
}

/// POST /canister/:id/mark-depleted. Failures are logged, never shown.
pub async fn mark_depleted(
    State(state): State<AppState>,
    Path(canister_id): Path<String>,
) -> Redirect {
    if let Err(e) = state.gauge_service().mark_depleted(&canister_id).await {
        warn!(canister_id = %canister_id, "Failed to mark canister as depleted: {}", e);
    }
    Redirect::to("/")
}

/// POST /canister/:id/reactivate
pub async fn reactivate(
    State(state): State<AppState>,
    Path(canister_id): Path<String>,
) -> Redirect {
    if let Err(e) = state.gauge_service().reactivate(&canister_id).await {
        warn!(canister_id = %canister_id, "Failed to reactivate canister: {}", e);
    }
    redirect_to_canister(&canister_id)
}

/// POST /canister/:id/delete
pub async fn delete_canister(
    State(state): State<AppState>,
    Path(canister_id): Path<String>,
) -> PageResult<Redirect> {
    match state.gauge_service().delete_canister(&canister_id).await {
        Ok(_) => Ok(Redirect::to("/")),
        Err(e) if e.is_not_found() => Ok(Redirect::to("/")),
        Err(e) => {
            error!(canister_id = %canister_id, "Failed to delete canister: {}", e);
            Err(e.into())
        }
    }
}

/// POST /canister/:id/update-label
pub async fn update_label(
    State(state): State<AppState>,
    Path(canister_id): Path<String>,
    Form(form): Form<UpdateLabel>,
) -> PageResult<Redirect> {
    state
        .gauge_service()
        .update_label(&canister_id, form)
        .await?;
    Ok(redirect_to_canister(&canister_id))
}

/// POST /weighing/:id/delete
pub async fn delete_weighing(
    State(state): State<AppState>,
    Path(weighing_id): Path<i32>,
) -> PageResult<Redirect> {
    match state.gauge_service().delete_weighing(weighing_id).await {
        Ok(canister_id) => Ok(redirect_to_canister(&canister_id)),
        Err(ServiceError::NotFound(_)) => Ok(Redirect::to("/")),
        Err(e) => {
            error!(weighing_id, "Failed to delete weighing: {}", e);
            Err(e.into())
        }
    }
}

/// POST /types/create
pub async fn create_type(
    State(state): State<AppState>,
    Form(form): Form<CreateCanisterType>,
) -> PageResult<Redirect> {
    state.gauge_service().create_canister_type(form).await?;
    Ok(Redirect::to("/types"))
}

/// POST /types/:id/delete
pub async fn delete_type(
    State(state): State<AppState>,
    Path(type_id): Path<i32>,
) -> PageResult<Redirect> {
    match state.gauge_service().delete_canister_type(type_id).await {
        Ok(_) => Ok(Redirect::to("/types")),
        Err(e) if e.is_not_found() => Ok(Redirect::to("/types")),
        Err(e) => {
            warn!(type_id, "Canister type not deleted: {}", e);
            Err(e.into())
        }
    }
}
