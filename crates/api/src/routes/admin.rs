//! Admin console endpoints. All require the admin role.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use catalog::CatalogStore;
use orders::{Order, OrderFilter, OrderRepository, OrderStatus, PaymentStatus, UpdateStatus};
use serde::Deserialize;

use crate::AppState;
use crate::auth::Identity;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::orders::parse_order_id;

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub tracking_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

/// PUT /admin/orders/:id/status — apply a lifecycle transition.
#[tracing::instrument(skip(state, req), fields(admin = %identity.user_id))]
pub async fn update_status<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    identity: Identity,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Order>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    identity.require_admin()?;

    let order_id = parse_order_id(&id)?;
    let new_status = OrderStatus::parse(&req.status)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown status: {}", req.status)))?;

    let order = state
        .orders
        .update_status(UpdateStatus {
            order_id,
            new_status,
            tracking_number: req.tracking_number,
            notes: req.notes,
        })
        .await?;

    Ok(Json(ApiResponse::ok("status updated", order)))
}

/// GET /admin/orders — list all orders, with optional status filters.
#[tracing::instrument(skip(state, query), fields(admin = %identity.user_id))]
pub async fn list_orders<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    identity: Identity,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    identity.require_admin()?;

    let status = query
        .status
        .as_deref()
        .map(|s| {
            OrderStatus::parse(s).ok_or_else(|| ApiError::BadRequest(format!("unknown status: {s}")))
        })
        .transpose()?;
    let payment_status = query
        .payment_status
        .as_deref()
        .map(|s| {
            PaymentStatus::parse(s)
                .ok_or_else(|| ApiError::BadRequest(format!("unknown payment status: {s}")))
        })
        .transpose()?;

    let orders = state
        .orders
        .list_orders(OrderFilter {
            status,
            payment_status,
        })
        .await?;

    Ok(Json(ApiResponse::ok("orders", orders)))
}
