use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;

use crate::ApiResponse;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// Ids go into a `Location` header, so anything outside the generated
/// alphabet falls back to the dashboard.
pub fn canister_location(canister_id: &str) -> String {
    let safe = !canister_id.is_empty()
        && canister_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if safe {
        format!("/canister/{}", canister_id)
    } else {
        "/".to_string()
    }
}

/// 303 to the canister page
pub fn redirect_to_canister(canister_id: &str) -> Redirect {
    Redirect::to(&canister_location(canister_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canister_location_only_accepts_safe_ids() {
        assert_eq!(canister_location("GC-a3f8e52468"), "/canister/GC-a3f8e52468");
        assert_eq!(canister_location("bad\nid"), "/");
        assert_eq!(canister_location("../etc"), "/");
        assert_eq!(canister_location(""), "/");
    }
}
