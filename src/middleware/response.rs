use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;

/// `{success: true, drinks: ...}` envelope shared by every drinks route
#[derive(Debug)]
pub struct DrinksResponse<T: Serialize> {
    pub drinks: T,
}

impl<T: Serialize> DrinksResponse<T> {
    pub fn new(drinks: T) -> Self {
        Self { drinks }
    }
}

impl<T: Serialize> IntoResponse for DrinksResponse<T> {
    fn into_response(self) -> Response {
        // Convert data to JSON Value for consistent envelope format
        let drinks = match serde_json::to_value(&self.drinks) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal_server_error("Failed to serialize response data").into_response();
            }
        };

        let envelope = json!({
            "success": true,
            "drinks": drinks
        });

        (StatusCode::OK, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<DrinksResponse<T>, ApiError>;
