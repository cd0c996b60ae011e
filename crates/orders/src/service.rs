//! Order lifecycle service.
//!
//! Validates order creation against the catalog, enforces the status
//! state machine, and applies every status write through the
//! repository's conditional update.

use std::sync::Arc;

use common::{Clock, OrderId, OrderNumber, SystemClock, UserId};
use catalog::CatalogStore;
use serde::{Deserialize, Serialize};

use crate::error::OrderError;
use crate::order::{Order, OrderItem, ShippingAddress, StatusChange};
use crate::repository::{OrderFilter, OrderPatch, OrderRepository, UpdateGuard};
use crate::status::{OrderStatus, PaymentMethod};

/// An item as requested by the client, carrying the price it saw.
///
/// The supplied unit price is only used to detect stale carts; the
/// persisted price always comes from the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestedItem {
    pub product_id: common::ProductId,
    pub unit_price: common::Money,
    pub quantity: u32,
}

/// Command to create a new order.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub user_id: UserId,
    pub items: Vec<RequestedItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Command for an admin-driven status transition.
#[derive(Debug, Clone)]
pub struct UpdateStatus {
    pub order_id: OrderId,
    pub new_status: OrderStatus,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

/// Public tracking projection, looked up by order number.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingInfo {
    pub order_number: OrderNumber,
    pub status: OrderStatus,
    pub tracking_number: Option<String>,
    pub status_history: Vec<StatusChange>,
}

/// Service for managing the order lifecycle.
pub struct OrderService<R: OrderRepository, C: CatalogStore> {
    repo: R,
    catalog: C,
    clock: Arc<dyn Clock>,
}

impl<R: OrderRepository, C: CatalogStore> OrderService<R, C> {
    /// Creates a new order service with the system clock.
    pub fn new(repo: R, catalog: C) -> Self {
        Self::with_clock(repo, catalog, Arc::new(SystemClock))
    }

    /// Creates an order service with an injected clock.
    pub fn with_clock(repo: R, catalog: C, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            catalog,
            clock,
        }
    }

    /// Creates a new order after validating every requested item
    /// against the catalog. Stock is not touched here; it is only
    /// decremented once a payment settles.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.user_id))]
    pub async fn create_order(&self, cmd: CreateOrder) -> Result<Order, OrderError> {
        if cmd.items.is_empty() {
            return Err(OrderError::NoItems);
        }

        let mut items = Vec::with_capacity(cmd.items.len());
        for requested in &cmd.items {
            if requested.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    quantity: requested.quantity,
                });
            }

            let product = self
                .catalog
                .get_product(&requested.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| OrderError::ProductNotFound(requested.product_id.clone()))?;

            if requested.quantity > product.stock {
                return Err(OrderError::OutOfStock {
                    product_id: requested.product_id.clone(),
                    requested: requested.quantity,
                    available: product.stock,
                });
            }

            if requested.unit_price != product.price {
                return Err(OrderError::PriceMismatch {
                    product_id: requested.product_id.clone(),
                    supplied: requested.unit_price,
                    current: product.price,
                });
            }

            items.push(OrderItem {
                product_id: product.id,
                product_name: product.name,
                unit_price: product.price,
                quantity: requested.quantity,
                image_ref: product.image_ref,
            });
        }

        let order = Order::create(
            cmd.user_id,
            items,
            cmd.shipping_address,
            cmd.payment_method,
            cmd.notes,
            self.clock.now(),
        );
        self.repo.insert(order.clone()).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, order_number = %order.order_number, "order created");

        Ok(order)
    }

    /// Cancels an order on behalf of its owner (or an admin).
    ///
    /// Only pending and confirmed orders can be cancelled; the payment
    /// status is left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        order_id: OrderId,
        requested_by: UserId,
        is_admin: bool,
    ) -> Result<Order, OrderError> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if !is_admin && !order.is_owned_by(requested_by) {
            return Err(OrderError::NotOwner);
        }

        if !order.status.can_cancel() {
            return Err(OrderError::NotCancellable {
                status: order.status,
            });
        }

        let applied = self
            .repo
            .conditional_update(
                order_id,
                UpdateGuard::status_is(order.status),
                OrderPatch::set_status(OrderStatus::Cancelled),
            )
            .await?;
        if !applied {
            return Err(OrderError::ConcurrentUpdate);
        }

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, "order cancelled");

        self.repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Applies an admin status transition, enforcing the lifecycle
    /// table and the tracking-number rule.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn update_status(&self, cmd: UpdateStatus) -> Result<Order, OrderError> {
        let order = self
            .repo
            .find_by_id(cmd.order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(cmd.order_id))?;

        if !order.status.can_transition_to(cmd.new_status) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: cmd.new_status,
            });
        }

        if cmd.tracking_number.is_some() && !cmd.new_status.accepts_tracking_number() {
            return Err(OrderError::TrackingNotAllowed {
                target: cmd.new_status,
            });
        }

        let patch = OrderPatch {
            status: Some(cmd.new_status),
            tracking_number: cmd.tracking_number,
            notes: cmd.notes,
            ..OrderPatch::default()
        };
        let applied = self
            .repo
            .conditional_update(cmd.order_id, UpdateGuard::status_is(order.status), patch)
            .await?;
        if !applied {
            return Err(OrderError::ConcurrentUpdate);
        }

        tracing::info!(order_id = %cmd.order_id, status = %cmd.new_status, "order status updated");

        self.repo
            .find_by_id(cmd.order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(cmd.order_id))
    }

    /// Public tracking lookup by order number. No ownership check:
    /// the order number itself is the capability.
    #[tracing::instrument(skip(self))]
    pub async fn track_order(&self, number: &OrderNumber) -> Result<TrackingInfo, OrderError> {
        let order = self
            .repo
            .find_by_order_number(number)
            .await?
            .ok_or_else(|| OrderError::UnknownOrderNumber(number.clone()))?;

        Ok(TrackingInfo {
            order_number: order.order_number,
            status: order.status,
            tracking_number: order.tracking_number,
            status_history: order.status_history,
        })
    }

    /// Loads an order for its owner or an admin.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(
        &self,
        order_id: OrderId,
        requested_by: UserId,
        is_admin: bool,
    ) -> Result<Order, OrderError> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if !is_admin && !order.is_owned_by(requested_by) {
            return Err(OrderError::NotOwner);
        }

        Ok(order)
    }

    /// Lists a user's own orders, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(self.repo.find_by_user(user_id).await?)
    }

    /// Lists orders for the admin console.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>, OrderError> {
        Ok(self.repo.list(filter).await?)
    }
}
