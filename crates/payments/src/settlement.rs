//! Payment settlement service.
//!
//! Enforces at-most-once settlement per order: the winning write is a
//! single conditional update guarded on `payment_status == pending`,
//! so two concurrent attempts can never both succeed.

use std::sync::Arc;
use std::time::Instant;

use catalog::CatalogStore;
use common::{Clock, Money, OrderId, SystemClock};
use orders::{
    Order, OrderPatch, OrderRepository, OrderStatus, PaymentMethod, PaymentStatus, UpdateGuard,
};
use serde::Serialize;

use crate::error::PaymentError;
use crate::gateway::{GatewayDecline, MockGateway};
use crate::validate::{FieldError, PaymentDetails, validate_details};

/// Result of a successful settlement.
#[derive(Debug, Clone, Serialize)]
pub struct Settlement {
    pub reference: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: &'static str,
    #[serde(skip)]
    pub order: Order,
}

/// Report returned by the pure pre-check endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

/// Service settling payments against orders.
pub struct SettlementService<R: OrderRepository, C: CatalogStore> {
    repo: R,
    catalog: C,
    gateway: MockGateway,
    clock: Arc<dyn Clock>,
}

impl<R: OrderRepository, C: CatalogStore> SettlementService<R, C> {
    /// Creates a settlement service with the default gateway and clock.
    pub fn new(repo: R, catalog: C) -> Self {
        Self::with_parts(repo, catalog, MockGateway::new(), Arc::new(SystemClock))
    }

    /// Creates a settlement service with injected gateway and clock.
    pub fn with_parts(repo: R, catalog: C, gateway: MockGateway, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            catalog,
            gateway,
            clock,
        }
    }

    /// Processes a payment for an order.
    ///
    /// On gateway failure the order is not touched at all, so the
    /// customer can retry with corrected details. On success exactly
    /// one attempt wins the conditional update; the loser observes
    /// `AlreadyPaid`.
    #[tracing::instrument(skip(self, details))]
    pub async fn process_payment(
        &self,
        order_id: OrderId,
        method: PaymentMethod,
        details: &PaymentDetails,
    ) -> Result<Settlement, PaymentError> {
        let started = Instant::now();

        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(PaymentError::OrderNotFound(order_id))?;

        // Early checks; the conditional update below is the
        // authoritative one.
        if order.payment_status == PaymentStatus::Paid {
            return Err(PaymentError::AlreadyPaid);
        }
        if order.status.is_terminal() {
            return Err(PaymentError::OrderClosed {
                status: order.status,
            });
        }

        let approval = self
            .gateway
            .charge(method, details, order.total)
            .await
            .map_err(|decline| {
                metrics::counter!("payments_declined_total").increment(1);
                match decline {
                    GatewayDecline::Declined => PaymentError::Declined,
                    GatewayDecline::Expired => PaymentError::Expired,
                    GatewayDecline::MissingFields(errors) => PaymentError::MissingFields(errors),
                }
            })?;

        // Payment success advances a pending order to confirmed; an
        // order an admin already confirmed keeps its status. Guarding
        // on the observed status keeps a concurrent cancellation from
        // producing a paid cancelled order.
        let guard = UpdateGuard {
            status: Some(order.status),
            payment_status: Some(PaymentStatus::Pending),
        };
        let mut patch = OrderPatch {
            payment_status: Some(PaymentStatus::Paid),
            payment_method: Some(method),
            payment_reference: Some(approval.reference.clone()),
            paid_at: Some(self.clock.now()),
            ..OrderPatch::default()
        };
        if order.status == OrderStatus::Pending {
            patch.status = Some(OrderStatus::Confirmed);
        }

        let applied = self.repo.conditional_update(order_id, guard, patch).await?;
        if !applied {
            // Something won between our read and write; reload to say
            // what.
            let current = self
                .repo
                .find_by_id(order_id)
                .await?
                .ok_or(PaymentError::OrderNotFound(order_id))?;
            return Err(if current.payment_status == PaymentStatus::Paid {
                PaymentError::AlreadyPaid
            } else if current.status.is_terminal() {
                PaymentError::OrderClosed {
                    status: current.status,
                }
            } else {
                PaymentError::ConcurrentUpdate
            });
        }

        for item in &order.items {
            if let Err(e) = self
                .catalog
                .decrement_stock(&item.product_id, item.quantity)
                .await
            {
                tracing::warn!(
                    product_id = %item.product_id,
                    error = %e,
                    "stock decrement failed after settlement"
                );
            }
        }

        metrics::counter!("payments_settled_total").increment(1);
        metrics::histogram!("payment_settlement_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(%order_id, reference = %approval.reference, "payment settled");

        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(PaymentError::OrderNotFound(order_id))?;

        Ok(Settlement {
            reference: approval.reference,
            amount: order.total,
            method,
            status: "completed",
            order,
        })
    }

    /// Pure pre-check of payment details; never mutates anything.
    pub fn validate(&self, method: PaymentMethod, details: &PaymentDetails) -> ValidationReport {
        let errors = validate_details(method, details, self.clock.now());
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}
