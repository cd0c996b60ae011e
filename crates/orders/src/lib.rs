//! Order lifecycle domain for the storefront order engine.
//!
//! This crate provides:
//! - the Order aggregate and its status state machine
//! - the OrderRepository contract with its conditional-update
//!   (compare-and-set) primitive, plus in-memory and PostgreSQL
//!   implementations
//! - the OrderService implementing creation, cancellation, admin
//!   status transitions, and the public tracking projection

pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod status;

pub use error::OrderError;
pub use memory::InMemoryOrderRepository;
pub use order::{Order, OrderItem, ShippingAddress, StatusChange};
pub use postgres::PostgresOrderRepository;
pub use repository::{OrderFilter, OrderPatch, OrderRepository, RepositoryError, UpdateGuard};
pub use service::{CreateOrder, OrderService, RequestedItem, TrackingInfo, UpdateStatus};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus};
