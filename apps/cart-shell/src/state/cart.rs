//! # Cart State
//!
//! The one cart engine for this session, shared by every command handler.

use std::sync::{Arc, Mutex, PoisonError};

use bazaar_core::{CartEngine, CartStorage};

/// The storage-erased engine the shell works with.
pub type SharedEngine = CartEngine<Box<dyn CartStorage + Send>>;

/// Shared cart state.
///
/// ## Thread Safety
/// `Arc<Mutex<_>>` gives each command exclusive access for the duration of
/// one engine call, so a mutation and its observer notifications complete
/// before the next command sees the cart.
#[derive(Clone)]
pub struct CartState {
    engine: Arc<Mutex<SharedEngine>>,
}

impl CartState {
    pub fn new(engine: SharedEngine) -> Self {
        CartState {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Executes a function with read access to the engine.
    ///
    /// ```rust,ignore
    /// let totals = cart_state.with_cart(|engine| engine.totals());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SharedEngine) -> R,
    {
        // Engine mutations complete before returning; a poisoned lock still guards a whole cart.
        let engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        f(&engine)
    }

    /// Executes a function with write access to the engine.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SharedEngine) -> R,
    {
        let mut engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{CartEntry, MemoryStorage, Money, ProductRef};

    #[test]
    fn test_clones_share_one_engine() {
        let storage: Box<dyn CartStorage + Send> = Box::new(MemoryStorage::new());
        let state = CartState::new(CartEngine::new(storage));
        let other = state.clone();

        other.with_cart_mut(|engine| {
            engine.add_item(CartEntry::product(ProductRef::new(
                "socks",
                "Wool Socks",
                Money::from_cents(1_200),
            )))
        });

        assert_eq!(state.with_cart(|engine| engine.item_count()), 1);
    }
}
