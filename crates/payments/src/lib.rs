//! Payment settlement for the storefront order engine.
//!
//! This crate provides:
//! - the mock per-method gateway with deterministic sentinel failures
//! - the shared payment-details validator
//! - the settlement service enforcing at-most-once settlement via the
//!   order repository's compare-and-set

pub mod error;
pub mod gateway;
pub mod latency;
pub mod settlement;
pub mod validate;

pub use error::PaymentError;
pub use gateway::{
    CARD_DECLINED, CARD_EXPIRED, GatewayApproval, GatewayDecline, MethodInfo, MockGateway,
    supported_methods,
};
pub use latency::{Latency, NoLatency, TokioLatency};
pub use settlement::{Settlement, SettlementService, ValidationReport};
pub use validate::{FieldError, PaymentDetails, validate_details};
