//! Shopping Cart Domain Module
//!
//! This module contains all shopping cart business logic, including:
//! - Domain models (Cart, LineItem, inputs, views)
//! - The cart store (identity resolution, reconciliation, merge)
//! - Pure reconciliation helpers
//! - Application state management
//! - REST API handlers

pub mod error;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod state;
pub mod store;

// Re-export commonly used types for convenience
pub use error::CartError;
pub use handlers::routes;
pub use state::{AppState, SharedState};
pub use store::CartStore;
