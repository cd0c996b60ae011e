//! Order repository contract.
//!
//! The conditional update is the only mutation primitive the lifecycle
//! and settlement services use for `status`/`payment_status`; it is
//! what makes the at-most-once settlement guard race-free.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{OrderId, OrderNumber, UserId};
use thiserror::Error;

use crate::order::{Order, StatusChange};
use crate::status::{OrderStatus, PaymentMethod, PaymentStatus};

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database failure.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization failure for stored JSON columns.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An order with the same ID or order number already exists.
    #[error("Duplicate order: {0}")]
    Duplicate(String),

    /// A stored row holds a value the domain no longer understands.
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Convenience result alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Expected prior state for a conditional update.
///
/// Every guarded field must match the stored row for the update to
/// apply. An empty guard applies unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateGuard {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateGuard {
    /// Guards on the current order status.
    pub fn status_is(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Guards on the current payment status.
    pub fn payment_status_is(payment_status: PaymentStatus) -> Self {
        Self {
            payment_status: Some(payment_status),
            ..Self::default()
        }
    }

    /// Returns true if the guard matches the given order.
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| s == order.status)
            && self.payment_status.is_none_or(|p| p == order.payment_status)
    }
}

/// Field-wise patch applied by a conditional update.
///
/// Only lifecycle fields are patchable; `items`, `total`, and the
/// shipping address are immutable after creation by contract.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

impl OrderPatch {
    /// Patch that moves the order to a new status.
    pub fn set_status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Applies the patch to an order in place, refreshing `updated_at`
    /// and appending to the status history on a status change.
    pub fn apply(&self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(status) = self.status
            && status != order.status
        {
            order.status = status;
            order.status_history.push(StatusChange {
                status,
                changed_at: now,
            });
        }
        if let Some(payment_status) = self.payment_status {
            order.payment_status = payment_status;
        }
        if let Some(method) = self.payment_method {
            order.payment_method = method;
        }
        if let Some(ref reference) = self.payment_reference {
            order.payment_reference = Some(reference.clone());
        }
        if let Some(paid_at) = self.paid_at {
            order.paid_at = Some(paid_at);
        }
        if let Some(ref tracking) = self.tracking_number {
            order.tracking_number = Some(tracking.clone());
        }
        if let Some(ref notes) = self.notes {
            order.notes = Some(notes.clone());
        }
        order.updated_at = now;
    }
}

/// Filters for the admin order listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
}

impl OrderFilter {
    /// Returns true if the order passes the filter.
    pub fn matches(&self, order: &Order) -> bool {
        self.status.is_none_or(|s| s == order.status)
            && self.payment_status.is_none_or(|p| p == order.payment_status)
    }
}

/// Trait for order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a newly created order.
    async fn insert(&self, order: Order) -> Result<()>;

    /// Loads an order by ID.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Loads an order by its public order number.
    async fn find_by_order_number(&self, number: &OrderNumber) -> Result<Option<Order>>;

    /// Lists a user's orders, newest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Lists orders matching the admin filter, newest first.
    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>>;

    /// Applies `patch` atomically iff `guard` matches the stored row.
    ///
    /// Returns `true` when the update applied; `false` when the guard
    /// did not match or the order does not exist. Never partially
    /// applies.
    async fn conditional_update(
        &self,
        id: OrderId,
        guard: UpdateGuard,
        patch: OrderPatch,
    ) -> Result<bool>;
}
