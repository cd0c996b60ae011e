//! Payment details validation.
//!
//! Single source of the field rules, consumed by both the gateway
//! handlers and the client-facing pre-check endpoint so the two can
//! never drift apart.

use chrono::{DateTime, Datelike, Utc};
use orders::PaymentMethod;
use serde::{Deserialize, Serialize};

/// Payment details as supplied by the client.
///
/// A single bag of optional fields; which ones are required depends on
/// the payment method.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PaymentDetails {
    pub card_number: Option<String>,
    pub card_holder: Option<String>,
    pub expiry_month: Option<u32>,
    pub expiry_year: Option<i32>,
    pub cvv: Option<String>,
    pub account_number: Option<String>,
    pub routing_number: Option<String>,
}

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn digits_only(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Validates payment details for a method. An empty result means the
/// details pass the pre-check.
pub fn validate_details(
    method: PaymentMethod,
    details: &PaymentDetails,
    now: DateTime<Utc>,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    match method {
        PaymentMethod::CreditCard => {
            match details.card_number.as_deref() {
                Some(number) if digits_only(number) && number.len() >= 13 => {}
                Some(_) => errors.push(FieldError::new(
                    "card_number",
                    "card number must be at least 13 digits",
                )),
                None => errors.push(FieldError::new("card_number", "card number is required")),
            }

            match details.expiry_month {
                Some(month) if (1..=12).contains(&month) => {}
                Some(_) => errors.push(FieldError::new(
                    "expiry_month",
                    "expiry month must be between 1 and 12",
                )),
                None => errors.push(FieldError::new("expiry_month", "expiry month is required")),
            }

            match details.expiry_year {
                Some(year) if year >= now.year() => {}
                Some(_) => errors.push(FieldError::new("expiry_year", "card expiry year is in the past")),
                None => errors.push(FieldError::new("expiry_year", "expiry year is required")),
            }

            match details.cvv.as_deref() {
                Some(cvv) if digits_only(cvv) && cvv.len() >= 3 => {}
                Some(_) => errors.push(FieldError::new("cvv", "cvv must be at least 3 digits")),
                None => errors.push(FieldError::new("cvv", "cvv is required")),
            }

            match details.card_holder.as_deref() {
                Some(holder) if holder.trim().len() >= 2 => {}
                Some(_) => errors.push(FieldError::new(
                    "card_holder",
                    "card holder name must be at least 2 characters",
                )),
                None => errors.push(FieldError::new("card_holder", "card holder name is required")),
            }
        }
        PaymentMethod::BankTransfer => {
            match details.account_number.as_deref() {
                Some(account) if digits_only(account) && account.len() >= 10 => {}
                Some(_) => errors.push(FieldError::new(
                    "account_number",
                    "account number must be at least 10 digits",
                )),
                None => errors.push(FieldError::new(
                    "account_number",
                    "account number is required",
                )),
            }

            match details.routing_number.as_deref() {
                Some(routing) if digits_only(routing) && routing.len() >= 8 => {}
                Some(_) => errors.push(FieldError::new(
                    "routing_number",
                    "routing number must be at least 8 digits",
                )),
                None => errors.push(FieldError::new(
                    "routing_number",
                    "routing number is required",
                )),
            }
        }
        // Settlement happens at the door; nothing to validate up front.
        PaymentMethod::CashOnDelivery => {}
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 26, 0, 0, 0).unwrap()
    }

    fn valid_card() -> PaymentDetails {
        PaymentDetails {
            card_number: Some("4111111111111111".to_string()),
            card_holder: Some("Ada Lovelace".to_string()),
            expiry_month: Some(12),
            expiry_year: Some(2027),
            cvv: Some("123".to_string()),
            ..PaymentDetails::default()
        }
    }

    #[test]
    fn test_valid_credit_card_passes() {
        assert!(validate_details(PaymentMethod::CreditCard, &valid_card(), now()).is_empty());
    }

    #[test]
    fn test_short_card_number_fails() {
        let mut details = valid_card();
        details.card_number = Some("411111111111".to_string());
        let errors = validate_details(PaymentMethod::CreditCard, &details, now());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "card_number");
    }

    #[test]
    fn test_missing_card_fields_each_reported() {
        let errors = validate_details(PaymentMethod::CreditCard, &PaymentDetails::default(), now());
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["card_number", "expiry_month", "expiry_year", "cvv", "card_holder"]
        );
    }

    #[test]
    fn test_expiry_year_in_past_fails() {
        let mut details = valid_card();
        details.expiry_year = Some(2025);
        let errors = validate_details(PaymentMethod::CreditCard, &details, now());
        assert_eq!(errors[0].field, "expiry_year");
    }

    #[test]
    fn test_current_year_is_accepted() {
        let mut details = valid_card();
        details.expiry_year = Some(2026);
        assert!(validate_details(PaymentMethod::CreditCard, &details, now()).is_empty());
    }

    #[test]
    fn test_invalid_month_fails() {
        let mut details = valid_card();
        details.expiry_month = Some(13);
        let errors = validate_details(PaymentMethod::CreditCard, &details, now());
        assert_eq!(errors[0].field, "expiry_month");
    }

    #[test]
    fn test_bank_transfer_rules() {
        let details = PaymentDetails {
            account_number: Some("1234567890".to_string()),
            routing_number: Some("12345678".to_string()),
            ..PaymentDetails::default()
        };
        assert!(validate_details(PaymentMethod::BankTransfer, &details, now()).is_empty());

        let short = PaymentDetails {
            account_number: Some("123".to_string()),
            routing_number: Some("123".to_string()),
            ..PaymentDetails::default()
        };
        let errors = validate_details(PaymentMethod::BankTransfer, &short, now());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_cash_on_delivery_needs_nothing() {
        assert!(
            validate_details(
                PaymentMethod::CashOnDelivery,
                &PaymentDetails::default(),
                now()
            )
            .is_empty()
        );
    }
}
