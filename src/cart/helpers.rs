//! Shopping Cart Business Logic Helpers
//!
//! This module contains the pure reconciliation functions shared by the cart
//! store: line-item identity matching, merge coalescing and formatting.

use super::models::{LineItem, SpecMap};
use uuid::Uuid;

/// Returns `true` when a line item represents the same selection as the
/// incoming (product, variant, specs) triple.
///
/// Spec maps compare structurally: same keys, same values, order-independent.
pub fn same_selection(
    item: &LineItem,
    product_id: Uuid,
    variant_id: Option<&str>,
    specs: &SpecMap,
) -> bool {
    item.product_id == product_id
        && item.variant_id.as_deref() == variant_id
        && item.specs == *specs
}

/// Folds `source_items` into `target_items`, aggregating quantities for
/// matching selections and cloning brand new lines.
///
/// # Behaviour
///
/// * If the target already holds a line for the same (product, variant,
///   specs) triple, its `quantity` is increased by the incoming quantity.
/// * Otherwise a new line is appended, carrying over the source snapshot
///   fields under a freshly minted id.
///
/// This function mutates `target_items` in-place.
pub fn fold_items(target_items: &mut Vec<LineItem>, source_items: Vec<LineItem>) {
    for incoming in source_items {
        let matched = target_items.iter_mut().find(|existing| {
            same_selection(
                existing,
                incoming.product_id,
                incoming.variant_id.as_deref(),
                &incoming.specs,
            )
        });

        if let Some(existing) = matched {
            // Aggregate quantities, saturating at u32::MAX.
            existing.quantity = existing.quantity.saturating_add(incoming.quantity);
        } else {
            // Clone the snapshot into a new line owned by the target cart.
            target_items.push(LineItem {
                id: Uuid::new_v4(),
                ..incoming
            });
        }
    }
}

/// Produces a human-readable one-line summary for a list of cart items.
///
/// Example output: `"2x Wireless Headphones, 1x Mechanical Keyboard"`.
pub fn format_item_summary(items: &[LineItem]) -> String {
    items
        .iter()
        .map(|i| format!("{}x {}", i.quantity, i.name))
        .collect::<Vec<_>>()
        .join(", ")
}
