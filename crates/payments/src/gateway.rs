//! Per-method mock payment gateway.
//!
//! Dispatch is an exhaustive match over the closed `PaymentMethod`
//! enum. Two sentinel card numbers trigger deterministic failures so
//! the decline paths stay testable without real gateway access.

use std::sync::Arc;
use std::time::Duration;

use common::{Clock, Money, SystemClock};
use orders::PaymentMethod;
use serde::Serialize;
use uuid::Uuid;

use crate::latency::{Latency, TokioLatency};
use crate::validate::{FieldError, PaymentDetails, validate_details};

/// Sentinel card number that is always declined.
pub const CARD_DECLINED: &str = "4000000000000002";

/// Sentinel card number that always reports an expired card.
pub const CARD_EXPIRED: &str = "4000000000000069";

/// Successful gateway charge.
#[derive(Debug, Clone)]
pub struct GatewayApproval {
    /// Opaque settlement reference, unique per attempt.
    pub reference: String,
}

/// Structured gateway failure. Leaves the order untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayDecline {
    Declined,
    Expired,
    MissingFields(Vec<FieldError>),
}

/// Static description of a supported method for `GET /payments/methods`.
#[derive(Debug, Clone, Serialize)]
pub struct MethodInfo {
    pub method: PaymentMethod,
    pub display_name: &'static str,
    pub fee: Money,
}

/// Returns the supported methods with their associated fees.
pub fn supported_methods() -> Vec<MethodInfo> {
    vec![
        MethodInfo {
            method: PaymentMethod::CreditCard,
            display_name: "Credit card",
            fee: Money::zero(),
        },
        MethodInfo {
            method: PaymentMethod::BankTransfer,
            display_name: "Bank transfer",
            fee: Money::zero(),
        },
        MethodInfo {
            method: PaymentMethod::CashOnDelivery,
            display_name: "Cash on delivery",
            fee: Money::from_cents(150),
        },
    ]
}

/// Mock gateway with injectable latency and clock.
#[derive(Clone)]
pub struct MockGateway {
    latency: Arc<dyn Latency>,
    clock: Arc<dyn Clock>,
}

impl MockGateway {
    /// Creates a gateway with real (bounded) latency and the system clock.
    pub fn new() -> Self {
        Self::with_parts(Arc::new(TokioLatency), Arc::new(SystemClock))
    }

    /// Creates a gateway with injected latency and clock.
    pub fn with_parts(latency: Arc<dyn Latency>, clock: Arc<dyn Clock>) -> Self {
        Self { latency, clock }
    }

    /// Attempts to charge `amount` using the given method and details.
    ///
    /// Side-effect-free until the caller records the outcome; a decline
    /// carries a structured reason and changes nothing.
    pub async fn charge(
        &self,
        method: PaymentMethod,
        details: &PaymentDetails,
        amount: Money,
    ) -> Result<GatewayApproval, GatewayDecline> {
        let errors = validate_details(method, details, self.clock.now());
        if !errors.is_empty() {
            return Err(GatewayDecline::MissingFields(errors));
        }

        match method {
            PaymentMethod::CreditCard => {
                self.latency.pause(Duration::from_millis(300)).await;

                match details.card_number.as_deref() {
                    Some(CARD_DECLINED) => return Err(GatewayDecline::Declined),
                    Some(CARD_EXPIRED) => return Err(GatewayDecline::Expired),
                    _ => {}
                }

                tracing::debug!(%amount, "mock credit card charge approved");
                Ok(Self::approval())
            }
            PaymentMethod::BankTransfer => {
                // Banks settle asynchronously; failure is rare and
                // reported out-of-band, so presence of the fields is
                // enough for the mock to approve.
                self.latency.pause(Duration::from_millis(1200)).await;
                tracing::debug!(%amount, "mock bank transfer accepted");
                Ok(Self::approval())
            }
            PaymentMethod::CashOnDelivery => {
                // Settles at delivery; this call only records intent.
                self.latency.pause(Duration::from_millis(50)).await;
                Ok(Self::approval())
            }
        }
    }

    fn approval() -> GatewayApproval {
        GatewayApproval {
            reference: format!("PAY-{}", Uuid::new_v4().simple()),
        }
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latency::NoLatency;
    use chrono::{TimeZone, Utc};
    use common::FixedClock;

    fn gateway() -> MockGateway {
        let now = Utc.with_ymd_and_hms(2026, 8, 26, 0, 0, 0).unwrap();
        MockGateway::with_parts(Arc::new(NoLatency), Arc::new(FixedClock(now)))
    }

    fn card(number: &str) -> PaymentDetails {
        PaymentDetails {
            card_number: Some(number.to_string()),
            card_holder: Some("Ada Lovelace".to_string()),
            expiry_month: Some(12),
            expiry_year: Some(2027),
            cvv: Some("123".to_string()),
            ..PaymentDetails::default()
        }
    }

    #[tokio::test]
    async fn test_valid_card_is_approved() {
        let approval = gateway()
            .charge(
                PaymentMethod::CreditCard,
                &card("4111111111111111"),
                Money::from_cents(19998),
            )
            .await
            .unwrap();
        assert!(approval.reference.starts_with("PAY-"));
    }

    #[tokio::test]
    async fn test_sentinel_cards_fail_deterministically() {
        let gw = gateway();
        let declined = gw
            .charge(
                PaymentMethod::CreditCard,
                &card(CARD_DECLINED),
                Money::from_cents(100),
            )
            .await;
        assert_eq!(declined.unwrap_err(), GatewayDecline::Declined);

        let expired = gw
            .charge(
                PaymentMethod::CreditCard,
                &card(CARD_EXPIRED),
                Money::from_cents(100),
            )
            .await;
        assert_eq!(expired.unwrap_err(), GatewayDecline::Expired);
    }

    #[tokio::test]
    async fn test_missing_fields_are_reported_before_latency() {
        let result = gateway()
            .charge(
                PaymentMethod::CreditCard,
                &PaymentDetails::default(),
                Money::from_cents(100),
            )
            .await;
        assert!(matches!(result, Err(GatewayDecline::MissingFields(_))));
    }

    #[tokio::test]
    async fn test_bank_transfer_succeeds_with_fields_present() {
        let details = PaymentDetails {
            account_number: Some("1234567890".to_string()),
            routing_number: Some("12345678".to_string()),
            ..PaymentDetails::default()
        };
        let approval = gateway()
            .charge(PaymentMethod::BankTransfer, &details, Money::from_cents(100))
            .await
            .unwrap();
        assert!(approval.reference.starts_with("PAY-"));
    }

    #[tokio::test]
    async fn test_cash_on_delivery_always_succeeds() {
        let approval = gateway()
            .charge(
                PaymentMethod::CashOnDelivery,
                &PaymentDetails::default(),
                Money::from_cents(100),
            )
            .await
            .unwrap();
        assert!(approval.reference.starts_with("PAY-"));
    }

    #[tokio::test]
    async fn test_references_are_unique_per_attempt() {
        let gw = gateway();
        let a = gw
            .charge(
                PaymentMethod::CashOnDelivery,
                &PaymentDetails::default(),
                Money::from_cents(100),
            )
            .await
            .unwrap();
        let b = gw
            .charge(
                PaymentMethod::CashOnDelivery,
                &PaymentDetails::default(),
                Money::from_cents(100),
            )
            .await
            .unwrap();
        assert_ne!(a.reference, b.reference);
    }

    #[test]
    fn test_supported_methods_cover_the_enum() {
        let methods = supported_methods();
        assert_eq!(methods.len(), PaymentMethod::ALL.len());
    }
}
