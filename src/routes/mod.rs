// Route exports
pub mod analyze;
pub mod stats;

use actix_web::{error, http::StatusCode, web, HttpResponse};
use crate::core::AnalysisPipeline;
use crate::services::{StatsCache, StatsStore};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: AnalysisPipeline,
    pub store: Arc<dyn StatsStore>,
    pub cache: Arc<StatsCache>,
    pub max_upload_bytes: usize,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg
        .configure(analyze::configure)
        .configure(stats::configure);
}

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    let status_code = match &err {
        error::JsonPayloadError::OverflowKnownLength { .. } | error::JsonPayloadError::Overflow { .. } => 413,
        _ => 400,
    };
    JsonError {
        error: "No image data provided".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code,
    }
    .into()
}
