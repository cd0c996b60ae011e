//! The Order aggregate and its value objects.

use chrono::{DateTime, Utc};
use common::{Money, OrderId, OrderNumber, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::status::{OrderStatus, PaymentMethod, PaymentStatus};

/// A line item in an order.
///
/// Fixed at creation; an order is an immutable snapshot of what was
/// purchased, priced from the catalog at creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// The product identifier.
    pub product_id: ProductId,

    /// Product name at purchase time.
    pub product_name: String,

    /// Price per unit at purchase time.
    pub unit_price: Money,

    /// Quantity ordered.
    pub quantity: u32,

    /// Reference to the product image shown at purchase time.
    pub image_ref: Option<String>,
}

impl OrderItem {
    /// Creates a new order item.
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            unit_price,
            quantity,
            image_ref: None,
        }
    }

    /// Returns the total price for this line (quantity * unit_price).
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Shipping destination, immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// One entry in an order's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
    pub changed_at: DateTime<Utc>,
}

/// The Order aggregate root.
///
/// `items`, `total`, `shipping_address`, `user_id`, and the
/// identifiers never change after creation. Everything else mutates
/// only through the repository's conditional update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub total: Money,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub shipping_address: ShippingAddress,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
    pub status_history: Vec<StatusChange>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a freshly created order in `Pending`/`Pending`.
    ///
    /// The total is computed from the items; callers are expected to
    /// have priced the items from the catalog already.
    pub fn create(
        user_id: UserId,
        items: Vec<OrderItem>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let total = items.iter().map(OrderItem::line_total).sum();
        Self {
            id: OrderId::new(),
            order_number: OrderNumber::generate(now),
            user_id,
            items,
            total,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method,
            payment_reference: None,
            paid_at: None,
            shipping_address,
            tracking_number: None,
            notes,
            status_history: vec![StatusChange {
                status: OrderStatus::Pending,
                changed_at: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the number of line items.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the order belongs to the given user.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}
