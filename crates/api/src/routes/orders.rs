//! Customer-facing order endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use catalog::CatalogStore;
use common::{OrderId, OrderNumber};
use orders::{
    CreateOrder, Order, OrderRepository, PaymentMethod, RequestedItem, ShippingAddress,
    TrackingInfo,
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::Identity;
use crate::error::ApiError;
use crate::response::ApiResponse;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub items: Vec<RequestedItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub notes: Option<String>,
}

// -- Handlers --

/// POST /orders — create a new order for the authenticated user.
#[tracing::instrument(skip(state, req), fields(user_id = %identity.user_id))]
pub async fn create<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    identity: Identity,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Order>>), ApiError>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    let payment_method = parse_payment_method(&req.payment_method)?;

    let order = state
        .orders
        .create_order(CreateOrder {
            user_id: identity.user_id,
            items: req.items,
            shipping_address: req.shipping_address,
            payment_method,
            notes: req.notes,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("order created", order)),
    ))
}

/// GET /orders — list the authenticated user's orders, newest first.
#[tracing::instrument(skip(state), fields(user_id = %identity.user_id))]
pub async fn list<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    identity: Identity,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    let orders = state.orders.orders_for_user(identity.user_id).await?;
    Ok(Json(ApiResponse::ok("orders", orders)))
}

/// GET /orders/:id — load one of the caller's orders.
#[tracing::instrument(skip(state), fields(user_id = %identity.user_id))]
pub async fn get<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .get_order(order_id, identity.user_id, identity.is_admin())
        .await?;
    Ok(Json(ApiResponse::ok("order", order)))
}

/// PATCH /orders/:id/cancel — cancel one of the caller's orders.
#[tracing::instrument(skip(state), fields(user_id = %identity.user_id))]
pub async fn cancel<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Order>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state
        .orders
        .cancel_order(order_id, identity.user_id, identity.is_admin())
        .await?;
    Ok(Json(ApiResponse::ok("order cancelled", order)))
}

/// GET /orders/track/:order_number — public tracking lookup.
///
/// No authentication: the opaque order number is the capability.
#[tracing::instrument(skip(state))]
pub async fn track<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    Path(order_number): Path<String>,
) -> Result<Json<ApiResponse<TrackingInfo>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    let info = state
        .orders
        .track_order(&OrderNumber::new(order_number))
        .await?;
    Ok(Json(ApiResponse::ok("tracking", info)))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    uuid::Uuid::parse_str(id)
        .map(OrderId::from_uuid)
        .map_err(|e| ApiError::BadRequest(format!("invalid order id: {e}")))
}

pub(crate) fn parse_payment_method(s: &str) -> Result<PaymentMethod, ApiError> {
    PaymentMethod::parse(s)
        .ok_or_else(|| ApiError::Payment(payments::PaymentError::InvalidMethod(s.to_string())))
}
