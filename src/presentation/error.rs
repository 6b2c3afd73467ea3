// API error type rendered as a JSON body
use crate::application::scheduler::SchedulerClosed;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error(transparent)]
    SchedulerUnavailable(#[from] SchedulerClosed),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::SchedulerUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
