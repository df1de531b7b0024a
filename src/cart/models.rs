//! Shopping Cart Domain Models
//!
//! This module contains all data structures related to the shopping cart
//! business domain.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// =============================================================================
// Cart Domain Models
// =============================================================================

/// Chosen product attributes (e.g. `{"color": "black"}`).
///
/// A `BTreeMap` keeps keys in canonical order, so equality between two spec
/// maps is structural and independent of insertion order.
pub type SpecMap = BTreeMap<String, String>;

/// Returns the default quantity (1) for cart items
fn default_quantity() -> u32 {
    1
}

/// One entry in a cart: a chosen product/variant/specification combination.
///
/// `name`, `price` and `cover` are snapshots of the product at add-time and
/// are intentionally not re-synced if the product changes later.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Unique identifier of this line item
    pub id: Uuid,

    /// Product this line refers to
    pub product_id: Uuid,

    /// Optional product variant
    pub variant_id: Option<String>,

    /// Quantity of this item, always at least 1
    pub quantity: u32,

    /// Unit price snapshot, in minor currency units
    pub price: u64,

    /// Product name snapshot
    pub name: String,

    /// Cover image snapshot
    pub cover: Option<String>,

    /// Chosen specifications (color, size, ...)
    pub specs: SpecMap,
}

/// The cart aggregate: owned by an authenticated user, an anonymous browser
/// session, or (transiently) both.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    /// Unique identifier of the cart
    pub id: Uuid,

    /// Owning user, set once authenticated
    pub user_id: Option<String>,

    /// Owning anonymous session
    pub session_id: Option<String>,

    /// Line items, in stable insertion order
    pub items: Vec<LineItem>,
}

impl Cart {
    /// Creates an empty cart for the given identity pair.
    pub fn new(user_id: Option<&str>, session_id: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.map(str::to_string),
            session_id: session_id.map(str::to_string),
            items: Vec::new(),
        }
    }

    /// Total amount over all line items (unit price x quantity).
    ///
    /// Computed fresh from the item list on every call, never cached.
    pub fn total(&self) -> u64 {
        self.items
            .iter()
            .map(|item| item.price * u64::from(item.quantity))
            .sum()
    }

    /// Total number of units across all line items.
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// JSON view of a cart, with the derived aggregate fields included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// Cart identifier
    pub id: Uuid,

    /// Owning user, if any
    pub user_id: Option<String>,

    /// Owning session, if any
    pub session_id: Option<String>,

    /// Line items in display order
    pub items: Vec<LineItem>,

    /// Sum of unit price x quantity over all items
    pub total: u64,

    /// Sum of quantities over all items
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            id: cart.id,
            user_id: cart.user_id.clone(),
            session_id: cart.session_id.clone(),
            items: cart.items.clone(),
            total: cart.total(),
            item_count: cart.item_count(),
        }
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Input for adding an item to the cart
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItemInput {
    /// Product to add
    pub product_id: Uuid,

    /// Optional variant of the product
    #[serde(default)]
    pub variant_id: Option<String>,

    /// Quantity to add (defaults to 1)
    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// Chosen specifications
    #[serde(default)]
    pub specs: SpecMap,
}

/// Partial update for an existing line item
#[derive(Debug, Deserialize)]
pub struct UpdateItemInput {
    /// New quantity for the line item
    pub quantity: Option<u32>,
}
