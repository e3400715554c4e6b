//! The fallback for requests that do not match any route.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::ErrorResponse;

/// Respond with a 404 and a JSON error body.
pub async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not found".to_owned(),
        }),
    )
        .into_response()
}
