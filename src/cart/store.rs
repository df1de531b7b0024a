//! Cart Store
//!
//! In-memory cart storage and the reconciliation operations over it. Carts
//! live in a `DashMap` keyed by cart id, with secondary owner indices for
//! user and session lookup. Every mutation runs while holding the cart's
//! shard guard, so the find-or-increment step of `add_item` cannot interleave
//! with a concurrent add on the same cart.

use super::error::CartError;
use super::helpers;
use super::models::{Cart, LineItem, NewItemInput, UpdateItemInput};
use crate::catalog::Product;
use dashmap::DashMap;
use uuid::Uuid;

/// Concurrent in-memory storage for carts.
pub struct CartStore {
    /// All carts, keyed by cart id.
    carts: DashMap<Uuid, Cart>,

    /// Owner index: authenticated user id -> cart id.
    by_user: DashMap<String, Uuid>,

    /// Owner index: anonymous session id -> cart id.
    by_session: DashMap<String, Uuid>,
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CartStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            carts: DashMap::new(),
            by_user: DashMap::new(),
            by_session: DashMap::new(),
        }
    }

    // =========================================================================
    // Identity resolution
    // =========================================================================

    /// Locates or creates exactly one cart for the given identity pair.
    ///
    /// A user-owned cart always takes precedence over a session cart; when
    /// neither lookup succeeds a new cart is created carrying whichever
    /// identifiers were supplied. Repeated calls with the same identifiers
    /// return the same cart.
    pub fn resolve(&self, user_id: Option<&str>, session_id: Option<&str>) -> Cart {
        if let Some(cart) = user_id.and_then(|uid| self.lookup(&self.by_user, uid)) {
            return cart;
        }

        if let Some(cart) = session_id.and_then(|sid| self.lookup(&self.by_session, sid)) {
            return cart;
        }

        self.create(user_id, session_id)
    }

    /// Returns the cart owned by `session_id`, without creating one.
    pub fn find_by_session(&self, session_id: &str) -> Option<Cart> {
        self.lookup(&self.by_session, session_id)
    }

    /// Returns a snapshot of the cart with the given id.
    pub fn get(&self, cart_id: Uuid) -> Option<Cart> {
        self.carts.get(&cart_id).map(|cart| cart.clone())
    }

    fn lookup(&self, index: &DashMap<String, Uuid>, key: &str) -> Option<Cart> {
        let cart_id = *index.get(key)?;
        self.carts.get(&cart_id).map(|cart| cart.clone())
    }

    fn create(&self, user_id: Option<&str>, session_id: Option<&str>) -> Cart {
        let cart = Cart::new(user_id, session_id);
        self.carts.insert(cart.id, cart.clone());

        // The primary owner key guards creation: if two requests race on the
        // same identity, the index entry keeps the first cart and the loser
        // discards its own.
        let owner_key = user_id.or(session_id);
        let Some(key) = owner_key else {
            return cart;
        };

        let index = if user_id.is_some() {
            &self.by_user
        } else {
            &self.by_session
        };

        let claimed = *index.entry(key.to_string()).or_insert(cart.id);
        if claimed != cart.id {
            self.carts.remove(&cart.id);
            return self.carts.get(&claimed).map(|c| c.clone()).unwrap_or(cart);
        }

        // Both identifiers were supplied and no cart matched either: register
        // the secondary index too.
        if user_id.is_some() {
            if let Some(sid) = session_id {
                self.by_session.entry(sid.to_string()).or_insert(cart.id);
            }
        }

        cart
    }

    // =========================================================================
    // Line-item reconciliation
    // =========================================================================

    /// Adds a product selection to the cart.
    ///
    /// When the cart already holds a line for the same (product, variant,
    /// specs) triple, its quantity is incremented; otherwise a new line is
    /// appended carrying the product snapshot. The decision and the write
    /// happen under the cart's shard guard.
    pub fn add_item(
        &self,
        cart_id: Uuid,
        input: NewItemInput,
        product: &Product,
    ) -> Result<LineItem, CartError> {
        if input.quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        let mut cart = self
            .carts
            .get_mut(&cart_id)
            .ok_or(CartError::CartNotFound(cart_id))?;

        let matched = cart.items.iter_mut().find(|item| {
            helpers::same_selection(
                item,
                input.product_id,
                input.variant_id.as_deref(),
                &input.specs,
            )
        });

        if let Some(existing) = matched {
            existing.quantity = existing.quantity.saturating_add(input.quantity);
            return Ok(existing.clone());
        }

        let item = LineItem {
            id: Uuid::new_v4(),
            product_id: input.product_id,
            variant_id: input.variant_id,
            quantity: input.quantity,
            price: product.price,
            name: product.name.clone(),
            cover: product.images.first().cloned(),
            specs: input.specs,
        };
        cart.items.push(item.clone());

        Ok(item)
    }

    /// Applies a partial update to a line item of the cart.
    pub fn update_item(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        update: UpdateItemInput,
    ) -> Result<LineItem, CartError> {
        if update.quantity == Some(0) {
            return Err(CartError::InvalidQuantity);
        }

        let mut cart = self
            .carts
            .get_mut(&cart_id)
            .ok_or(CartError::CartNotFound(cart_id))?;

        let item = cart
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(CartError::ItemNotFound(item_id))?;

        if let Some(quantity) = update.quantity {
            item.quantity = quantity;
        }

        Ok(item.clone())
    }

    /// Removes a line item from the cart.
    pub fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<(), CartError> {
        let mut cart = self
            .carts
            .get_mut(&cart_id)
            .ok_or(CartError::CartNotFound(cart_id))?;

        let position = cart
            .items
            .iter()
            .position(|item| item.id == item_id)
            .ok_or(CartError::ItemNotFound(item_id))?;

        cart.items.remove(position);
        Ok(())
    }

    /// Empties the cart's line items. The cart itself persists, and clearing
    /// an already-empty cart succeeds.
    pub fn clear(&self, cart_id: Uuid) -> Result<(), CartError> {
        let mut cart = self
            .carts
            .get_mut(&cart_id)
            .ok_or(CartError::CartNotFound(cart_id))?;

        cart.items.clear();
        Ok(())
    }

    // =========================================================================
    // Merge (guest -> authenticated transition)
    // =========================================================================

    /// Folds the source cart's items into the target cart, then clears the
    /// source. Matching (product, variant, specs) triples coalesce into one
    /// line with summed quantity. Returns the surviving target cart.
    pub fn merge(&self, source_id: Uuid, target_id: Uuid) -> Result<Cart, CartError> {
        if source_id == target_id {
            return self.get(target_id).ok_or(CartError::CartNotFound(target_id));
        }

        // Check the target up front so a missing target cannot swallow the
        // drained source items.
        if !self.carts.contains_key(&target_id) {
            return Err(CartError::CartNotFound(target_id));
        }

        // Drain the source before locking the target: holding two shard
        // guards at once can deadlock.
        let drained = {
            let mut source = self
                .carts
                .get_mut(&source_id)
                .ok_or(CartError::CartNotFound(source_id))?;
            std::mem::take(&mut source.items)
        };

        let mut target = self
            .carts
            .get_mut(&target_id)
            .ok_or(CartError::CartNotFound(target_id))?;

        helpers::fold_items(&mut target.items, drained);
        Ok(target.clone())
    }
}
