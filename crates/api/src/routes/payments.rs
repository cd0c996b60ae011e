//! Payment endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use catalog::CatalogStore;
use common::Money;
use orders::{Order, OrderRepository, PaymentMethod};
use payments::{MethodInfo, PaymentDetails, Settlement, ValidationReport, supported_methods};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::auth::Identity;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::routes::orders::parse_payment_method;

#[derive(Deserialize)]
pub struct ProcessPaymentRequest {
    pub order_id: String,
    pub payment_method: String,
    #[serde(default)]
    pub payment_details: PaymentDetails,
}

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub payment_method: String,
    #[serde(default)]
    pub payment_details: PaymentDetails,
}

/// The settled payment, nested under `payment` in the response body.
#[derive(Serialize)]
pub struct PaymentSummary {
    pub reference: String,
    pub amount: Money,
    pub method: PaymentMethod,
    pub status: &'static str,
}

/// Settlement payload returned to the client: `{payment, order}`.
#[derive(Serialize)]
pub struct SettlementResponse {
    pub payment: PaymentSummary,
    pub order: Order,
}

impl From<Settlement> for SettlementResponse {
    fn from(settlement: Settlement) -> Self {
        Self {
            payment: PaymentSummary {
                reference: settlement.reference,
                amount: settlement.amount,
                method: settlement.method,
                status: settlement.status,
            },
            order: settlement.order,
        }
    }
}

/// POST /payments/process — settle a payment for one of the caller's
/// orders.
#[tracing::instrument(skip(state, req), fields(user_id = %identity.user_id))]
pub async fn process<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    identity: Identity,
    Json(req): Json<ProcessPaymentRequest>,
) -> Result<Json<ApiResponse<SettlementResponse>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    let order_id = super::orders::parse_order_id(&req.order_id)?;
    let method = parse_payment_method(&req.payment_method)?;

    // Ownership check up front; the settlement service itself is
    // identity-agnostic.
    state
        .orders
        .get_order(order_id, identity.user_id, identity.is_admin())
        .await?;

    let settlement = state
        .payments
        .process_payment(order_id, method, &req.payment_details)
        .await?;

    Ok(Json(ApiResponse::ok(
        "payment settled",
        SettlementResponse::from(settlement),
    )))
}

/// POST /payments/validate — pre-check payment details without
/// touching any order.
pub async fn validate<R, C>(
    State(state): State<Arc<AppState<R, C>>>,
    Json(req): Json<ValidateRequest>,
) -> Result<Json<ApiResponse<ValidationReport>>, ApiError>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    let method = parse_payment_method(&req.payment_method)?;
    let report = state.payments.validate(method, &req.payment_details);
    Ok(Json(ApiResponse::ok("validation", report)))
}

/// GET /payments/methods — list supported methods and their fees.
pub async fn methods() -> Json<ApiResponse<Vec<MethodInfo>>> {
    Json(ApiResponse::ok("payment methods", supported_methods()))
}
