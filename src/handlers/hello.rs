//! Static endpoints

use crate::models::api::StatusMessage;
use axum::Json;

/// GET /
pub async fn teapot() -> &'static str {
    "I'm a teapot"
}

/// GET|POST /api/hello
pub async fn hello() -> Json<StatusMessage> {
    Json(StatusMessage::ok("Hello world!"))
}
