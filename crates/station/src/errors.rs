//! Request-level error taxonomy.
//!
//! Every failure a handler can return maps to a machine-readable reason tag
//! in the JSON body, so callers can distinguish outcomes by content rather
//! than by HTTP status alone. Ingestion-path errors always fire before any
//! state mutation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::resolver;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid credential")]
    Auth,
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("invalid value for field {field}: {value:?}")]
    InvalidValue { field: String, value: String },
    #[error(transparent)]
    Resolver(#[from] resolver::Error),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth => StatusCode::UNAUTHORIZED,
            ApiError::MissingField(_) | ApiError::InvalidValue { .. } => StatusCode::BAD_REQUEST,
            ApiError::Resolver(resolver::Error::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Resolver(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable tag for the `error` field.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::Auth => "auth",
            ApiError::MissingField(_) => "missing_field",
            ApiError::InvalidValue { .. } => "invalid_value",
            ApiError::Resolver(resolver::Error::Timeout) => "resolver_timeout",
            ApiError::Resolver(_) => "resolver",
            ApiError::Database(_) => "database",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.reason(),
            "detail": self.to_string(),
        });

        let field = match &self {
            ApiError::MissingField(name) => Some(name.clone()),
            ApiError::InvalidValue { field, .. } => Some(field.clone()),
            _ => None,
        };
        if let Some(field) = field {
            body["field"] = json!(field);
        }

        (self.status(), Json(body)).into_response()
    }
}
