use crate::client::ApiError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

#[derive(Serialize)]
pub struct Success<T> {
    pub success: bool,
    pub data: T,
}

pub fn success<T: Serialize>(data: T) -> Json<Success<T>> {
    Json(Success {
        success: true,
        data,
    })
}

#[derive(Serialize)]
struct Failure {
    success: bool,
    message: String,
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, String, String, Option<String>) {
        match self {
            AppError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                "VALIDATION_ERROR".to_string(),
                Some(details.clone()),
            ),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                message.clone(),
                "NOT_FOUND".to_string(),
                None,
            ),
            AppError::Api(ApiError::Timeout(_)) => (
                StatusCode::GATEWAY_TIMEOUT,
                "Booking system did not respond in time".to_string(),
                "TIMEOUT".to_string(),
                None,
            ),
            AppError::Api(ApiError::RetriesExhausted { .. }) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Booking system is temporarily unavailable".to_string(),
                "SERVICE_UNAVAILABLE".to_string(),
                None,
            ),
            AppError::Api(ApiError::Vendor(vendor)) => {
                let status = if vendor.is_not_found() {
                    StatusCode::NOT_FOUND
                } else if vendor.is_auth() {
                    StatusCode::BAD_GATEWAY
                } else {
                    StatusCode::BAD_REQUEST
                };
                (
                    status,
                    vendor.message.clone(),
                    format!("TOURPLAN_{}", vendor.code),
                    Some(vendor.detail.clone()).filter(|d| !d.is_empty()),
                )
            }
            AppError::Api(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred processing your request".to_string(),
                "INTERNAL_ERROR".to_string(),
                None,
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, code, details) = self.parts();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        } else {
            warn!(%status, error = %self, "request rejected");
        }

        let body = Failure {
            success: false,
            message,
            error: code,
            details,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml_response::VendorError;
    use test_case::test_case;

    #[test_case(AppError::Validation("bad date".into()), StatusCode::BAD_REQUEST)]
    #[test_case(AppError::Api(ApiError::Timeout(30000)), StatusCode::GATEWAY_TIMEOUT)]
    #[test_case(AppError::Api(ApiError::RetriesExhausted { attempts: 3, last_error: "x".into() }), StatusCode::SERVICE_UNAVAILABLE)]
    #[test_case(AppError::Api(ApiError::Vendor(VendorError::from_detail("1052 missing"))), StatusCode::NOT_FOUND)]
    #[test_case(AppError::Api(ApiError::Vendor(VendorError::from_detail("1050 missing"))), StatusCode::NOT_FOUND)]
    #[test_case(AppError::Api(ApiError::Vendor(VendorError::from_detail("1051 denied"))), StatusCode::BAD_GATEWAY)]
    #[test_case(AppError::Api(ApiError::Vendor(VendorError::from_detail("1002 bad"))), StatusCode::BAD_REQUEST)]
    #[test_case(AppError::Api(ApiError::NetworkError("reset".into())), StatusCode::INTERNAL_SERVER_ERROR)]
    fn test_status_mapping(error: AppError, status: StatusCode) {
        assert_eq!(error.into_response().status(), status);
    }

    #[test]
    fn test_vendor_error_code_in_body() {
        let (_, message, code, details) =
            AppError::Api(ApiError::Vendor(VendorError::from_detail("1051 SCN denied"))).parts();
        assert_eq!(message, "Authentication failed");
        assert_eq!(code, "TOURPLAN_1051");
        assert_eq!(details.as_deref(), Some("1051 SCN denied"));
    }
}
