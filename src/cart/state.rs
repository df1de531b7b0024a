//! Shopping Cart State Management
//!
//! This module wires the application state shared by all request handlers:
//! the cart store and the product catalog collaborator.

use super::store::CartStore;
use crate::catalog::ProductCatalog;
use std::sync::Arc;

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state containing the cart store and the product catalog
pub struct AppState {
    /// In-memory cart storage with owner indices.
    pub carts: CartStore,

    /// Product lookup used for add-time snapshots.
    pub catalog: ProductCatalog,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Creates a new AppState with empty carts and a seeded demo catalog
    pub fn new() -> Self {
        Self {
            carts: CartStore::new(),
            catalog: ProductCatalog::with_demo_products(),
        }
    }
}
