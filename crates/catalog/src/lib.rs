//! Catalog store collaborator boundary.
//!
//! The catalog itself (product CRUD, search, media) lives in another
//! service; the order engine only consults it for price, stock, and
//! the active flag, and decrements stock once a payment settles.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the catalog collaborator.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product does not exist or is not active.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Stock cannot cover the requested decrement.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Transport or storage failure inside the collaborator.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Product record as seen by the order engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: u32,
    pub is_active: bool,
    pub image_ref: Option<String>,
}

impl Product {
    /// Creates an active product with the given price and stock.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            is_active: true,
            image_ref: None,
        }
    }
}

/// Trait for catalog lookups and stock mutation.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches a product by ID. Returns `None` for unknown products;
    /// inactive products are returned so callers can distinguish them.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError>;

    /// Decrements stock for a product. Called once per item on
    /// confirmed payment, never at order creation.
    async fn decrement_stock(&self, id: &ProductId, quantity: u32) -> Result<(), CatalogError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, Product>,
}

/// In-memory catalog for the dev server and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product.
    pub fn put_product(&self, product: Product) {
        self.state
            .write()
            .unwrap()
            .products
            .insert(product.id.clone(), product);
    }

    /// Returns the current stock for a product, if it exists.
    pub fn stock_of(&self, id: &ProductId) -> Option<u32> {
        self.state.read().unwrap().products.get(id).map(|p| p.stock)
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.state.read().unwrap().products.get(id).cloned())
    }

    async fn decrement_stock(&self, id: &ProductId, quantity: u32) -> Result<(), CatalogError> {
        let mut state = self.state.write().unwrap();
        let product = state
            .products
            .get_mut(id)
            .ok_or_else(|| CatalogError::ProductNotFound(id.clone()))?;

        if product.stock < quantity {
            return Err(CatalogError::InsufficientStock {
                product_id: id.clone(),
                requested: quantity,
                available: product.stock,
            });
        }

        product.stock -= quantity;
        Ok(())
    }
}
