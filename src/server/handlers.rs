//! Request handlers.

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::AppState;
use crate::error::ReelError;

/// Body of `POST /resolve`.
#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub reel_url: String,
    #[serde(default)]
    pub cookie_header: Option<String>,
}

/// Optional body of `POST /reels/:username`.
#[derive(Debug, Default, Deserialize)]
pub struct ReelsQuery {
    #[serde(default)]
    pub max: Option<usize>,
    #[serde(default)]
    pub cookie_header: Option<String>,
}

fn error_response(status: StatusCode, kind: &str, detail: String) -> Response {
    (
        status,
        Json(serde_json::json!({ "kind": kind, "detail": detail })),
    )
        .into_response()
}

fn validation_error(detail: String) -> Response {
    error_response(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", detail)
}

impl IntoResponse for ReelError {
    fn into_response(self) -> Response {
        let status = match &self {
            ReelError::InvalidUrl(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReelError::Resolution(_) | ReelError::Collection(_) => StatusCode::BAD_GATEWAY,
        };
        error_response(status, self.kind(), self.to_string())
    }
}

/// Health check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "ok": true,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Resolve the direct media URL of a reel.
pub async fn resolve(
    State(state): State<AppState>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return validation_error(rejection.body_text()),
    };
    match state
        .service
        .resolve(&payload.reel_url, payload.cookie_header.as_deref())
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List an account's reels. The JSON body is optional.
pub async fn list_reels(
    State(state): State<AppState>,
    Path(username): Path<String>,
    body: Bytes,
) -> Response {
    let query = if body.iter().all(u8::is_ascii_whitespace) {
        ReelsQuery::default()
    } else {
        match serde_json::from_slice::<ReelsQuery>(&body) {
            Ok(query) => query,
            Err(e) => return validation_error(format!("invalid request body: {}", e)),
        }
    };

    match state
        .service
        .list_reels(&username, query.max, query.cookie_header.as_deref())
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}
