use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use barter_types::api::NoticeResponse;
use barter_types::validation::ValidationErrors;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::ADS_PATH;

/// Everything a handler can fail with, mapped onto a status code in
/// [`IntoResponse`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Db(#[from] barter_db::Error),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("authentication required")]
    Unauthorized,

    #[error("{0}")]
    Conflict(&'static str),

    #[error("internal error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) | ApiError::Db(barter_db::Error::Validation(errors)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            // Refused ad mutations send the caller back to the listing.
            ApiError::Db(barter_db::Error::Forbidden(message)) => (
                StatusCode::FORBIDDEN,
                Json(NoticeResponse {
                    message,
                    redirect: ADS_PATH.to_string(),
                }),
            )
                .into_response(),
            ApiError::Db(barter_db::Error::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("{entity} {id} not found") })),
            )
                .into_response(),
            ApiError::Db(e) => {
                error!("Database error: {}", e);
                internal()
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "authentication required" })),
            )
                .into_response(),
            ApiError::Conflict(message) => {
                (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Internal => internal(),
        }
    }
}

fn internal() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
        .into_response()
}
