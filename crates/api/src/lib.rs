//! HTTP API server with observability for the storefront order engine.
//!
//! Exposes the customer order endpoints, the public tracking lookup,
//! the admin console, and payment settlement, with structured logging
//! (tracing) and Prometheus metrics.

pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, patch, post, put};
use catalog::{CatalogStore, InMemoryCatalog, Product};
use common::Money;
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{InMemoryOrderRepository, OrderRepository, OrderService};
use payments::SettlementService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<R: OrderRepository, C: CatalogStore> {
    pub orders: OrderService<R, C>,
    pub payments: SettlementService<R, C>,
}

/// Builds the application state from a repository and catalog.
pub fn create_state<R, C>(repo: R, catalog: C) -> Arc<AppState<R, C>>
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    Arc::new(AppState {
        orders: OrderService::new(repo.clone(), catalog.clone()),
        payments: SettlementService::new(repo, catalog),
    })
}

/// Returns the demo catalog used when no external catalog is wired up.
pub fn demo_catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    catalog.put_product(Product::new(
        "SKU-001",
        "Mechanical Keyboard",
        Money::from_cents(9999),
        50,
    ));
    catalog.put_product(Product::new(
        "SKU-002",
        "Wireless Mouse",
        Money::from_cents(3499),
        120,
    ));
    catalog.put_product(Product::new(
        "SKU-003",
        "USB-C Dock",
        Money::from_cents(14999),
        25,
    ));
    catalog
}

/// Creates the default in-memory state with the demo catalog.
pub fn create_default_state() -> (
    Arc<AppState<InMemoryOrderRepository, InMemoryCatalog>>,
    InMemoryOrderRepository,
    InMemoryCatalog,
) {
    let repo = InMemoryOrderRepository::new();
    let catalog = demo_catalog();
    let state = create_state(repo.clone(), catalog.clone());
    (state, repo, catalog)
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, C>(state: Arc<AppState<R, C>>, metrics_handle: PrometheusHandle) -> Router
where
    R: OrderRepository + Clone + 'static,
    C: CatalogStore + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::render))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<R, C>))
        .route("/orders", get(routes::orders::list::<R, C>))
        .route("/orders/track/{order_number}", get(routes::orders::track::<R, C>))
        .route("/orders/{id}", get(routes::orders::get::<R, C>))
        .route("/orders/{id}/cancel", patch(routes::orders::cancel::<R, C>))
        .route(
            "/admin/orders/{id}/status",
            put(routes::admin::update_status::<R, C>),
        )
        .route("/admin/orders", get(routes::admin::list_orders::<R, C>))
        .route("/payments/process", post(routes::payments::process::<R, C>))
        .route("/payments/validate", post(routes::payments::validate::<R, C>))
        .route("/payments/methods", get(routes::payments::methods))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
