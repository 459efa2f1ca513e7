use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::database::record::{Record, RecordVecExt};
use crate::error::ApiError;
use crate::operations::outcome::Outcome;
use crate::resource::Resource;

/// Wrapper for API responses that automatically adds success envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self { data, status_code: None }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code: Some(status_code) }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "data": {},
                        "error": {
                            "type": "error",
                            "message": crate::error::GENERIC_ERROR_MESSAGE,
                            "data": {},
                        }
                    })),
                )
                    .into_response();
            }
        };

        // Wrap in success envelope
        let envelope = json!({
            "success": true,
            "data": data_value
        });

        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// A value an operation can hand back, keyed for the response body.
pub trait ResponseValue {
    fn into_response_data(self, resource: &Resource) -> Map<String, Value>;
}

impl ResponseValue for Record {
    fn into_response_data(self, resource: &Resource) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(resource.singular_name().to_string(), self.to_api_output());
        data
    }
}

impl ResponseValue for Vec<Record> {
    fn into_response_data(self, resource: &Resource) -> Map<String, Value> {
        let mut data = Map::new();
        data.insert(resource.plural_name().to_string(), self.to_api());
        data
    }
}

impl ResponseValue for Map<String, Value> {
    fn into_response_data(self, _resource: &Resource) -> Map<String, Value> {
        self
    }
}

/// Turns an outcome into the response: the value keyed by the resource's
/// singular or plural name, merged over `extra`. Failures keep both.
pub fn respond<T: ResponseValue>(
    resource: &Resource,
    outcome: Outcome<T>,
    extra: Map<String, Value>,
    status: StatusCode,
) -> ApiResult<Map<String, Value>> {
    let (value, error) = outcome.into_parts();

    let mut data = extra;
    if let Some(value) = value {
        data.extend(value.into_response_data(resource));
    }

    match error {
        None => Ok(ApiResponse::with_status(data, status)),
        Some(error) => Err(ApiError::with_data(error, data)),
    }
}
