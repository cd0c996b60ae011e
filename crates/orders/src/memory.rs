//! In-memory order repository for the dev server and tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{Clock, OrderId, OrderNumber, SystemClock, UserId};
use tokio::sync::RwLock;

use crate::order::Order;
use crate::repository::{OrderFilter, OrderPatch, OrderRepository, RepositoryError, Result, UpdateGuard};

/// In-memory order repository.
///
/// Provides the same interface as the PostgreSQL implementation. The
/// conditional update runs guard check and patch under one write
/// lock, so concurrent settlements observe a real compare-and-set.
#[derive(Clone)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository with the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates a repository with an injected clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }
}

impl Default for InMemoryOrderRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(RepositoryError::Duplicate(order.id.to_string()));
        }
        if orders
            .values()
            .any(|o| o.order_number == order.order_number)
        {
            return Err(RepositoryError::Duplicate(order.order_number.to_string()));
        }
        orders.insert(order.id, order);
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_by_order_number(&self, number: &OrderNumber) -> Result<Option<Order>> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .find(|o| &o.order_number == number)
            .cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn conditional_update(
        &self,
        id: OrderId,
        guard: UpdateGuard,
        patch: OrderPatch,
    ) -> Result<bool> {
        let mut orders = self.orders.write().await;
        let Some(order) = orders.get_mut(&id) else {
            return Ok(false);
        };

        if !guard.matches(order) {
            return Ok(false);
        }

        patch.apply(order, self.clock.now());
        Ok(true)
    }
}
