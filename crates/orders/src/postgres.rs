//! PostgreSQL-backed order repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Clock, Money, OrderId, OrderNumber, SystemClock, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::order::{Order, StatusChange};
use crate::repository::{
    OrderFilter, OrderPatch, OrderRepository, RepositoryError, Result, UpdateGuard,
};
use crate::status::{OrderStatus, PaymentMethod, PaymentStatus};

/// PostgreSQL order repository.
///
/// The conditional update is a single `UPDATE ... WHERE` carrying the
/// guard columns; the row count tells whether the compare-and-set won.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL repository with the system clock.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    /// Creates a repository with an injected clock.
    pub fn with_clock(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status_str: String = row.try_get("status")?;
        let status = OrderStatus::parse(&status_str)
            .ok_or_else(|| RepositoryError::Corrupt(format!("unknown status {status_str:?}")))?;

        let payment_status_str: String = row.try_get("payment_status")?;
        let payment_status = PaymentStatus::parse(&payment_status_str).ok_or_else(|| {
            RepositoryError::Corrupt(format!("unknown payment status {payment_status_str:?}"))
        })?;

        let payment_method_str: String = row.try_get("payment_method")?;
        let payment_method = PaymentMethod::parse(&payment_method_str).ok_or_else(|| {
            RepositoryError::Corrupt(format!("unknown payment method {payment_method_str:?}"))
        })?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            order_number: OrderNumber::new(row.try_get::<String, _>("order_number")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            items: serde_json::from_value(row.try_get("items")?)?,
            total: Money::from_cents(row.try_get("total_cents")?),
            status,
            payment_status,
            payment_method,
            payment_reference: row.try_get("payment_reference")?,
            paid_at: row.try_get("paid_at")?,
            shipping_address: serde_json::from_value(row.try_get("shipping_address")?)?,
            tracking_number: row.try_get("tracking_number")?,
            notes: row.try_get("notes")?,
            status_history: serde_json::from_value(row.try_get("status_history")?)?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }
}

const SELECT_COLUMNS: &str = "id, order_number, user_id, items, total_cents, status, \
     payment_status, payment_method, payment_reference, paid_at, shipping_address, \
     tracking_number, notes, status_history, created_at, updated_at";

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn insert(&self, order: Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, order_number, user_id, items, total_cents, status,
                payment_status, payment_method, payment_reference, paid_at, shipping_address,
                tracking_number, notes, status_history, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.order_number.as_str())
        .bind(order.user_id.as_uuid())
        .bind(serde_json::to_value(&order.items)?)
        .bind(order.total.cents())
        .bind(order.status.as_str())
        .bind(order.payment_status.as_str())
        .bind(order.payment_method.as_str())
        .bind(&order.payment_reference)
        .bind(order.paid_at)
        .bind(serde_json::to_value(&order.shipping_address)?)
        .bind(&order.tracking_number)
        .bind(&order.notes)
        .bind(serde_json::to_value(&order.status_history)?)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Duplicate(order.id.to_string());
            }
            RepositoryError::Database(e)
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_order_number(&self, number: &OrderNumber) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE order_number = $1"
        ))
        .bind(number.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn list(&self, filter: OrderFilter) -> Result<Vec<Order>> {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM orders WHERE 1=1");
        let mut param_count = 0;

        if filter.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
        if filter.payment_status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND payment_status = ${param_count}"));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = sqlx::query(&sql);
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }
        if let Some(payment_status) = filter.payment_status {
            query = query.bind(payment_status.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn conditional_update(
        &self,
        id: OrderId,
        guard: UpdateGuard,
        patch: OrderPatch,
    ) -> Result<bool> {
        let now = self.clock.now();

        let mut sets = vec!["updated_at = $1".to_string()];
        let mut param_count = 1;

        // The history entry is appended only when the stored status
        // actually changes; the CASE keeps the write idempotent.
        let history_entry = patch
            .status
            .map(|status| {
                serde_json::to_value(vec![StatusChange {
                    status,
                    changed_at: now,
                }])
            })
            .transpose()?;

        if patch.status.is_some() {
            param_count += 1;
            let status_param = param_count;
            param_count += 1;
            let history_param = param_count;
            sets.push(format!(
                "status_history = status_history || CASE WHEN status = ${status_param} \
                 THEN '[]'::jsonb ELSE ${history_param}::jsonb END"
            ));
            sets.push(format!("status = ${status_param}"));
        }
        if patch.payment_status.is_some() {
            param_count += 1;
            sets.push(format!("payment_status = ${param_count}"));
        }
        if patch.payment_method.is_some() {
            param_count += 1;
            sets.push(format!("payment_method = ${param_count}"));
        }
        if patch.payment_reference.is_some() {
            param_count += 1;
            sets.push(format!("payment_reference = ${param_count}"));
        }
        if patch.paid_at.is_some() {
            param_count += 1;
            sets.push(format!("paid_at = ${param_count}"));
        }
        if patch.tracking_number.is_some() {
            param_count += 1;
            sets.push(format!("tracking_number = ${param_count}"));
        }
        if patch.notes.is_some() {
            param_count += 1;
            sets.push(format!("notes = ${param_count}"));
        }

        param_count += 1;
        let id_param = param_count;
        let mut sql = format!(
            "UPDATE orders SET {} WHERE id = ${id_param}",
            sets.join(", ")
        );
        if guard.status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND status = ${param_count}"));
        }
        if guard.payment_status.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND payment_status = ${param_count}"));
        }

        let mut query = sqlx::query(&sql).bind(now);
        if let Some(status) = patch.status {
            query = query.bind(status.as_str());
            query = query.bind(history_entry.clone());
        }
        if let Some(payment_status) = patch.payment_status {
            query = query.bind(payment_status.as_str());
        }
        if let Some(method) = patch.payment_method {
            query = query.bind(method.as_str());
        }
        if let Some(ref reference) = patch.payment_reference {
            query = query.bind(reference);
        }
        if let Some(paid_at) = patch.paid_at {
            query = query.bind(paid_at);
        }
        if let Some(ref tracking) = patch.tracking_number {
            query = query.bind(tracking);
        }
        if let Some(ref notes) = patch.notes {
            query = query.bind(notes);
        }
        query = query.bind(id.as_uuid());
        if let Some(status) = guard.status {
            query = query.bind(status.as_str());
        }
        if let Some(payment_status) = guard.payment_status {
            query = query.bind(payment_status.as_str());
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
