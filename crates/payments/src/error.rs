//! Payment error types.

use common::OrderId;
use orders::{OrderStatus, RepositoryError};
use thiserror::Error;

use crate::validate::FieldError;

/// Errors that can occur while settling a payment.
///
/// Gateway declines are expected outcomes, not faults: they carry a
/// structured reason so the caller can show an actionable message, and
/// they never mutate the order.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Order already has a successful settlement recorded.
    #[error("Order has already been paid")]
    AlreadyPaid,

    /// Order reached a terminal status and will never ship; payment
    /// is refused rather than collected for nothing.
    #[error("Order is {status} and can no longer be paid")]
    OrderClosed { status: OrderStatus },

    /// A concurrent update changed the order between read and write;
    /// the order is still payable.
    #[error("Order was modified concurrently, please retry")]
    ConcurrentUpdate,

    /// Requested method is not one of the supported enum values.
    #[error("Unsupported payment method: {0}")]
    InvalidMethod(String),

    /// Gateway declined the charge.
    #[error("Payment declined by gateway")]
    Declined,

    /// Gateway reported the card as expired.
    #[error("Card has expired")]
    Expired,

    /// Required payment detail fields are missing or malformed.
    #[error("Payment details are invalid")]
    MissingFields(Vec<FieldError>),

    /// Repository failure.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl PaymentError {
    /// Stable machine-readable code for the API `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::OrderNotFound(_) => "order_not_found",
            PaymentError::AlreadyPaid => "already_paid",
            PaymentError::OrderClosed { .. } => "order_closed",
            PaymentError::ConcurrentUpdate => "conflict",
            PaymentError::InvalidMethod(_) => "invalid_method",
            PaymentError::Declined => "declined",
            PaymentError::Expired => "expired",
            PaymentError::MissingFields(_) => "missing_fields",
            PaymentError::Repository(_) => "internal",
        }
    }
}
