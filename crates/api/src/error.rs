//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orders::OrderError;
use payments::PaymentError;

/// API-level error type that maps to HTTP responses.
///
/// The error body carries the same envelope shape as success responses
/// (`success: false`), plus a stable machine-readable `error` code.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed caller identity.
    Unauthorized(String),
    /// Caller identity is valid but lacks the required role.
    Forbidden(String),
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Order domain error.
    Order(OrderError),
    /// Payment settlement error.
    Payment(PaymentError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field_errors) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Order(err) => order_error_to_response(err),
            ApiError::Payment(err) => payment_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    "internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = serde_json::json!({
            "success": false,
            "message": message,
            "error": code,
            "timestamp": chrono::Utc::now(),
        });
        if let Some(errors) = field_errors {
            body["errors"] = errors;
        }

        (status, axum::Json(body)).into_response()
    }
}

type ErrorParts = (
    StatusCode,
    &'static str,
    String,
    Option<serde_json::Value>,
);

fn order_error_to_response(err: OrderError) -> ErrorParts {
    let message = err.to_string();
    match err {
        OrderError::OrderNotFound(_) | OrderError::UnknownOrderNumber(_) => {
            (StatusCode::NOT_FOUND, "order_not_found", message, None)
        }
        OrderError::NotOwner => (StatusCode::FORBIDDEN, "forbidden", message, None),
        OrderError::ProductNotFound(_) => {
            (StatusCode::BAD_REQUEST, "product_not_found", message, None)
        }
        OrderError::OutOfStock { .. } => (StatusCode::BAD_REQUEST, "out_of_stock", message, None),
        OrderError::PriceMismatch { .. } => {
            (StatusCode::BAD_REQUEST, "price_mismatch", message, None)
        }
        OrderError::NoItems | OrderError::InvalidQuantity { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_items", message, None)
        }
        OrderError::NotCancellable { .. } => {
            (StatusCode::BAD_REQUEST, "not_cancellable", message, None)
        }
        OrderError::InvalidTransition { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_transition", message, None)
        }
        OrderError::TrackingNotAllowed { .. } => {
            (StatusCode::BAD_REQUEST, "tracking_not_allowed", message, None)
        }
        OrderError::ConcurrentUpdate => (StatusCode::CONFLICT, "conflict", message, None),
        OrderError::Repository(_) | OrderError::Catalog(_) => {
            tracing::error!(error = %message, "order operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "internal server error".to_string(),
                None,
            )
        }
    }
}

fn payment_error_to_response(err: PaymentError) -> ErrorParts {
    let code = err.code();
    let message = err.to_string();
    match err {
        PaymentError::OrderNotFound(_) => (StatusCode::NOT_FOUND, code, message, None),
        PaymentError::MissingFields(errors) => (
            StatusCode::BAD_REQUEST,
            code,
            message,
            serde_json::to_value(errors).ok(),
        ),
        PaymentError::AlreadyPaid
        | PaymentError::InvalidMethod(_)
        | PaymentError::Declined
        | PaymentError::Expired => (StatusCode::BAD_REQUEST, code, message, None),
        PaymentError::OrderClosed { .. } | PaymentError::ConcurrentUpdate => {
            (StatusCode::CONFLICT, code, message, None)
        }
        PaymentError::Repository(_) => {
            tracing::error!(error = %message, "payment operation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "internal server error".to_string(),
                None,
            )
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Order(err)
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        ApiError::Payment(err)
    }
}
