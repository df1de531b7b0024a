//! Product Catalog Module
//!
//! The cart's product collaborator: an in-memory catalog used for add-time
//! snapshots, plus the read-side endpoints the storefront queries.

use crate::cart::error::CartError;
use crate::cart::state::SharedState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

/// A product as the cart sees it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Free-form description
    pub description: String,

    /// Unit price in minor currency units
    pub price: u64,

    /// Category label
    pub category: String,

    /// Image URLs; the first one becomes the cart line's cover snapshot
    pub images: Vec<String>,

    /// Inactive products cannot be added to a cart
    pub is_active: bool,
}

/// Concurrent in-memory product storage.
pub struct ProductCatalog {
    products: DashMap<Uuid, Product>,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self {
            products: DashMap::new(),
        }
    }

    /// Creates a catalog seeded with a handful of demo products.
    pub fn with_demo_products() -> Self {
        let catalog = Self::new();
        for product in demo_products() {
            catalog.insert(product);
        }
        catalog
    }

    /// Inserts or replaces a product.
    pub fn insert(&self, product: Product) {
        self.products.insert(product.id, product);
    }

    /// Looks up an active product. Missing and inactive products both come
    /// back as `None`.
    pub fn find_active(&self, id: Uuid) -> Option<Product> {
        self.products
            .get(&id)
            .filter(|product| product.is_active)
            .map(|product| product.clone())
    }

    /// Returns all active products, sorted by name for stable output.
    pub fn list_active(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self
            .products
            .iter()
            .filter(|entry| entry.is_active)
            .map(|entry| entry.clone())
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        products
    }
}

fn demo_products() -> Vec<Product> {
    vec![
        Product {
            id: Uuid::new_v4(),
            name: "Wireless Headphones".into(),
            description: "Over-ear, noise cancelling".into(),
            price: 12_900,
            category: "audio".into(),
            images: vec!["/images/headphones.jpg".into()],
            is_active: true,
        },
        Product {
            id: Uuid::new_v4(),
            name: "Mechanical Keyboard".into(),
            description: "Hot-swappable switches".into(),
            price: 8_900,
            category: "peripherals".into(),
            images: vec!["/images/keyboard.jpg".into()],
            is_active: true,
        },
        Product {
            id: Uuid::new_v4(),
            name: "Cotton T-Shirt".into(),
            description: "Available in several colors and sizes".into(),
            price: 2_500,
            category: "apparel".into(),
            images: vec!["/images/tshirt.jpg".into()],
            is_active: true,
        },
        Product {
            id: Uuid::new_v4(),
            name: "Discontinued Speaker".into(),
            description: "No longer sold".into(),
            price: 15_000,
            category: "audio".into(),
            images: vec![],
            is_active: false,
        },
    ]
}

// =============================================================================
// Read-side endpoints
// =============================================================================

/// Creates routes for catalog lookups
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
}

/// Endpoint: GET /products
async fn list_products(State(state): State<SharedState>) -> Json<Vec<Product>> {
    Json(state.catalog.list_active())
}

/// Endpoint: GET /products/:id
async fn get_product(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, CartError> {
    state
        .catalog
        .find_active(id)
        .map(Json)
        .ok_or(CartError::ProductNotFound(id))
}
