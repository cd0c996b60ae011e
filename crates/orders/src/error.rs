//! Order domain error types.

use common::{Money, OrderId, OrderNumber, ProductId};
use thiserror::Error;

use crate::repository::RepositoryError;
use crate::status::OrderStatus;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Order does not exist.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// No order carries the given order number.
    #[error("Order not found: {0}")]
    UnknownOrderNumber(OrderNumber),

    /// Product missing from the catalog or not active.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Requested quantity exceeds available stock.
    #[error("Out of stock: {product_id} (requested {requested}, available {available})")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Client-supplied unit price differs from the catalog price.
    /// Defends against stale-cart tampering.
    #[error("Price mismatch for {product_id}: supplied {supplied}, current {current}")]
    PriceMismatch {
        product_id: ProductId,
        supplied: Money,
        current: Money,
    },

    /// Order must contain at least one item.
    #[error("Order has no items")]
    NoItems,

    /// Item quantity must be positive.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Caller is neither the owner nor an admin.
    #[error("Not authorized to access this order")]
    NotOwner,

    /// Cancellation is only allowed from pending or confirmed.
    #[error("order can no longer be cancelled")]
    NotCancellable { status: OrderStatus },

    /// Status transition not in the lifecycle table.
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Tracking number requires the target status to be processing or later.
    #[error("Tracking number cannot be set for status {target}")]
    TrackingNotAllowed { target: OrderStatus },

    /// A concurrent update won the conditional write.
    #[error("Order was modified concurrently, please retry")]
    ConcurrentUpdate,

    /// Repository failure.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Catalog collaborator failure.
    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),
}
