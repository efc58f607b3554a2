//! Shared shopping-cart store.
//!
//! DESIGN
//! ======
//! The cart is the one piece of state every storefront view shares. It is
//! an explicitly owned handle (clone to share) over a mutex-guarded list,
//! never an ambient global. Entries are keyed by product id with at most
//! one entry per id; list order is first-add order. `items` returns an
//! owned snapshot, so no caller can mutate past the store's invariants.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

// =============================================================================
// CART ITEM
// =============================================================================

/// A product line in the cart: product id, quantity, and whatever other
/// attributes the catalog attached to the product, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product id, unique within the cart.
    pub id: u64,
    /// Quantity. Signed and unvalidated; quantity semantics belong to the
    /// caller.
    pub quantidade: i64,
    /// Remaining product attributes, flattened at the serde boundary.
    #[serde(flatten)]
    pub attrs: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// ERROR TYPE
// =============================================================================

/// Errors produced by cart mutations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// The targeted product id has no entry in the cart.
    #[error("no cart item with id {id}")]
    ItemNotFound { id: u64 },
}

// =============================================================================
// CART STORE
// =============================================================================

/// Shared cart state. Cloning the store clones the handle, not the cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Mutex<Vec<CartItem>>>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(Vec::new())) }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CartItem>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add an item: an existing entry with the same id absorbs the incoming
    /// quantity (additive merge, first-seen attributes win); otherwise the
    /// item is appended.
    pub fn add(&self, item: CartItem) {
        let mut items = self.lock();
        if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
            existing.quantidade += item.quantidade;
        } else {
            items.push(item);
        }
    }

    /// Set the quantity of the entry with the given id (absolute, not
    /// additive).
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if no entry matches; the cart is
    /// left unchanged.
    pub fn update(&self, id: u64, quantidade: i64) -> Result<(), CartError> {
        let mut items = self.lock();
        let item = items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(CartError::ItemNotFound { id })?;
        item.quantidade = quantidade;
        Ok(())
    }

    /// Remove and return the entry with the given id. Remaining entries
    /// keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] if no entry matches.
    pub fn remove(&self, id: u64) -> Result<CartItem, CartError> {
        let mut items = self.lock();
        let position = items
            .iter()
            .position(|i| i.id == id)
            .ok_or(CartError::ItemNotFound { id })?;
        Ok(items.remove(position))
    }

    /// Snapshot of the current items in first-add order. The snapshot is
    /// owned; mutating it does not touch the store.
    #[must_use]
    pub fn items(&self) -> Vec<CartItem> {
        self.lock().clone()
    }

    /// Number of distinct product entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
