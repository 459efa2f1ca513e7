// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Map, Value};

use crate::database::manager::DatabaseError;
use crate::operations::error::OperationError;
use crate::resource::ResourceError;

/// Shown in place of any error outside the operation taxonomy.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong when processing the request.";

/// HTTP API error: a failed operation plus whatever response data was
/// gathered before it failed.
#[derive(Debug)]
pub enum ApiError {
    Operation {
        error: OperationError,
        data: Map<String, Value>,
    },

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn operation(error: OperationError) -> Self {
        ApiError::Operation { error, data: Map::new() }
    }

    pub fn with_data(error: OperationError, data: Map<String, Value>) -> Self {
        ApiError::Operation { error, data }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Operation { error, .. } => match error {
                OperationError::InvalidParameters { .. }
                | OperationError::UnknownAttributes { .. }
                | OperationError::InvalidRecord { .. } => StatusCode::BAD_REQUEST,
                OperationError::NotFound { .. } => StatusCode::NOT_FOUND,
                OperationError::FailedValidation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                OperationError::Other { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::Operation { error: OperationError::Other { .. }, .. } => GENERIC_ERROR_MESSAGE.to_string(),
            ApiError::Operation { error, .. } => error.message(),
            ApiError::ServiceUnavailable(message) => message.clone(),
        }
    }

    /// `{ type, message, data }` with internal details removed
    pub fn error_json(&self) -> Value {
        match self {
            ApiError::Operation { error: OperationError::Other { .. }, .. } => json!({
                "type": "error",
                "message": GENERIC_ERROR_MESSAGE,
                "data": {},
            }),
            ApiError::Operation { error, .. } => error.as_json(),
            ApiError::ServiceUnavailable(message) => json!({
                "type": "service_unavailable",
                "message": message,
                "data": {},
            }),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let data = match self {
            ApiError::Operation { data, .. } => Value::Object(data.clone()),
            ApiError::ServiceUnavailable(_) => json!({}),
        };

        json!({
            "success": false,
            "data": data,
            "error": self.error_json(),
        })
    }
}

impl From<OperationError> for ApiError {
    fn from(error: OperationError) -> Self {
        ApiError::operation(error)
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::operation(err.into())
    }
}

impl From<ResourceError> for ApiError {
    fn from(err: ResourceError) -> Self {
        ApiError::operation(OperationError::other(err.to_string()))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Operation { error: OperationError::Other { message }, .. } = &self {
            tracing::error!("Request failed: {}", message);
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
