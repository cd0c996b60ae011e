//! Shared value objects for the storefront order engine.
//!
//! Provides the typed identifiers, the cents-based `Money` type, and
//! the injectable `Clock` used across the order and payment crates.

pub mod clock;
pub mod money;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use money::Money;
pub use types::{OrderId, OrderNumber, ProductId, UserId};
