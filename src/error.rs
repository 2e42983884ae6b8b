use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

// ---------------------------------------------------------------------------
// Dataset validation errors (fatal at startup)
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: column '{column}' is empty")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row}: class must be 0 or 1, got '{value}'")]
    InvalidClass { row: usize, value: String },

    #[error("row {row}: payload mass must be a non-negative number, got '{value}'")]
    InvalidPayload { row: usize, value: String },

    #[error("row {row}: column '{column}' has unsupported type {data_type}")]
    UnsupportedType {
        row: usize,
        column: &'static str,
        data_type: String,
    },
}

// ---------------------------------------------------------------------------
// Request errors (reported to the browser)
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid payload interval [{lo}, {hi}]")]
    InvalidInterval { lo: f64, hi: f64 },

    #[error("unknown control '{0}'")]
    UnknownControl(String),

    #[error("no handler bound to output '{0}'")]
    UnboundOutput(&'static str),

    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnboundOutput(_) => {
                log::error!("{self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => {
                log::warn!("rejecting request: {self}");
                StatusCode::BAD_REQUEST
            }
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
