//! # Cart Engine
//!
//! Wraps a [`Cart`] with a storage adapter and a set of observers.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Every Mutation                                    │
//! │                                                                         │
//! │   engine.update_quantity(id, 3)                                         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Cart::update_quantity ──► None? ──► done (no save, no notify)        │
//! │        │ Some(event)                                                    │
//! │        ▼                                                                │
//! │   event.is_persistent()? ──► storage.save(snapshot)                    │
//! │        │                      └── Err → warn!, keep going              │
//! │        ▼                                                                │
//! │   observers, in registration order: on_cart_event(&event, &cart)       │
//! │                                                                         │
//! │   The mutation has fully completed before any observer runs.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info, warn};

use crate::cart::{Cart, CartEvent, CartTotals};
use crate::identity::LineId;
use crate::item::{CartEntry, CartItem};
use crate::money::Money;
use crate::storage::CartStorage;
use crate::types::AddonSelection;

// =============================================================================
// Observer Trait
// =============================================================================

/// Receives cart change notifications.
///
/// Implementations must not block; they run inline with the mutation.
pub trait CartObserver: Send + Sync {
    fn on_cart_event(&self, event: &CartEvent, cart: &Cart);
}

impl<F> CartObserver for F
where
    F: Fn(&CartEvent, &Cart) + Send + Sync,
{
    fn on_cart_event(&self, event: &CartEvent, cart: &Cart) {
        self(event, cart)
    }
}

/// Handle returned by [`CartEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

// =============================================================================
// Engine
// =============================================================================

/// The observable, persisted cart.
///
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use bazaar_core::{CartEngine, CartEntry, CartEvent, Money, NoopStorage, ProductRef};
///
/// let seen = Arc::new(Mutex::new(Vec::new()));
/// let sink = Arc::clone(&seen);
///
/// let mut engine = CartEngine::new(NoopStorage);
/// engine.subscribe(move |event: &CartEvent, _: &bazaar_core::Cart| {
///     sink.lock().unwrap().push(event.clone());
/// });
///
/// engine.add_item(CartEntry::product(ProductRef::new("cap", "Cap", Money::from_cents(1500))));
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
pub struct CartEngine<S: CartStorage> {
    cart: Cart,
    storage: S,
    observers: Vec<(SubscriptionId, Box<dyn CartObserver>)>,
    next_subscription: u64,
}

impl<S: CartStorage> CartEngine<S> {
    /// Builds an engine and rehydrates it from `storage`.
    ///
    /// Nothing stored, or a payload that fails to load, starts an empty cart.
    pub fn new(storage: S) -> Self {
        let cart = match storage.load() {
            Ok(Some(persisted)) => {
                let cart = Cart::rehydrate(persisted);
                info!(
                    lines = cart.line_count(),
                    items = cart.item_count(),
                    "Cart rehydrated from storage"
                );
                cart
            }
            Ok(None) => {
                debug!("No stored cart, starting empty");
                Cart::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to rehydrate cart, starting empty");
                Cart::new()
            }
        };

        CartEngine {
            cart,
            storage,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    // -------------------------------------------------------------------------
    // Observers
    // -------------------------------------------------------------------------

    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    pub fn add_item(&mut self, entry: CartEntry) -> Option<CartEvent> {
        let event = self.cart.add_item(entry);
        self.commit(event)
    }

    pub fn remove_item(&mut self, id: &LineId) -> Option<CartEvent> {
        let event = self.cart.remove_item(id);
        self.commit(event)
    }

    pub fn update_quantity(&mut self, id: &LineId, quantity: i64) -> Option<CartEvent> {
        let event = self.cart.update_quantity(id, quantity);
        self.commit(event)
    }

    pub fn update_addons(&mut self, id: &LineId, addons: Vec<AddonSelection>) -> Option<CartEvent> {
        let event = self.cart.update_addons(id, addons);
        self.commit(event)
    }

    pub fn clear_cart(&mut self) -> Option<CartEvent> {
        let event = self.cart.clear();
        self.commit(event)
    }

    pub fn apply_discount(&mut self, code: impl Into<String>, amount: Money) -> Option<CartEvent> {
        let event = self.cart.apply_discount(code, amount);
        self.commit(event)
    }

    pub fn remove_discount(&mut self) -> Option<CartEvent> {
        let event = self.cart.remove_discount();
        self.commit(event)
    }

    pub fn open_cart(&mut self) -> Option<CartEvent> {
        let event = self.cart.open();
        self.commit(event)
    }

    pub fn close_cart(&mut self) -> Option<CartEvent> {
        let event = self.cart.close();
        self.commit(event)
    }

    pub fn toggle_cart(&mut self) -> Option<CartEvent> {
        let event = self.cart.toggle();
        self.commit(event)
    }

    /// Persists (when needed) and then notifies observers.
    fn commit(&mut self, event: Option<CartEvent>) -> Option<CartEvent> {
        let event = event?;

        if event.is_persistent() {
            self.persist();
        }

        for (_, observer) in &self.observers {
            observer.on_cart_event(&event, &self.cart);
        }

        Some(event)
    }

    fn persist(&self) {
        if let Err(e) = self.storage.save(&self.cart.snapshot()) {
            warn!(error = %e, "Failed to persist cart, keeping in-memory state");
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn item(&self, id: &LineId) -> Option<&CartItem> {
        self.cart.item(id)
    }

    pub fn subtotal(&self) -> Money {
        self.cart.subtotal()
    }

    pub fn tax(&self) -> Money {
        self.cart.tax()
    }

    pub fn total(&self) -> Money {
        self.cart.total()
    }

    pub fn item_count(&self) -> i64 {
        self.cart.item_count()
    }

    pub fn totals(&self) -> CartTotals {
        self.cart.totals()
    }

    pub fn is_open(&self) -> bool {
        self.cart.is_open()
    }

    pub fn discount_code(&self) -> Option<&str> {
        self.cart.discount_code()
    }

    pub fn discount_amount(&self) -> Money {
        self.cart.discount_amount()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::error::{StorageError, StorageResult};
    use crate::storage::MemoryStorage;
    use crate::types::ProductRef;
    use crate::PersistedCart;

    fn kettle() -> CartEntry {
        CartEntry::product(ProductRef::new("kettle", "Kettle", Money::from_cents(3_500)))
    }

    struct FailingStorage;

    impl CartStorage for FailingStorage {
        fn load(&self) -> StorageResult<Option<PersistedCart>> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }

        fn save(&self, _cart: &PersistedCart) -> StorageResult<()> {
            Err(StorageError::Backend("quota exceeded".to_string()))
        }
    }

    #[test]
    fn test_mutations_persist() {
        let storage = Arc::new(MemoryStorage::new());
        let mut engine = CartEngine::new(Arc::clone(&storage));

        engine.add_item(kettle().with_quantity(2));
        engine.apply_discount("TEA", Money::from_cents(100));

        assert_eq!(storage.save_count(), 2);
        let restored = CartEngine::new(Arc::clone(&storage));
        assert_eq!(restored.item_count(), 2);
        assert_eq!(restored.discount_code(), Some("TEA"));
        assert!(!restored.is_open());
    }

    #[test]
    fn test_noops_do_not_persist_or_notify() {
        let storage = Arc::new(MemoryStorage::new());
        let mut engine = CartEngine::new(Arc::clone(&storage));
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        engine.subscribe(move |_: &CartEvent, _: &Cart| *counter.lock().unwrap() += 1);

        assert!(engine.remove_item(&LineId::from("missing")).is_none());
        assert!(engine.remove_discount().is_none());
        assert!(engine.close_cart().is_none());

        assert_eq!(storage.save_count(), 0);
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_drawer_events_notify_without_persisting() {
        let storage = Arc::new(MemoryStorage::new());
        let mut engine = CartEngine::new(Arc::clone(&storage));
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        engine.subscribe(move |event: &CartEvent, _: &Cart| sink.lock().unwrap().push(event.clone()));

        engine.toggle_cart();
        engine.toggle_cart();

        assert_eq!(storage.save_count(), 0);
        assert_eq!(*events.lock().unwrap(), vec![CartEvent::Opened, CartEvent::Closed]);
    }

    #[test]
    fn test_observers_see_completed_state_in_order() {
        let mut engine = CartEngine::new(MemoryStorage::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&log);
        engine.subscribe(move |_: &CartEvent, cart: &Cart| {
            first.lock().unwrap().push(("first", cart.item_count()));
        });
        let second = Arc::clone(&log);
        engine.subscribe(move |_: &CartEvent, cart: &Cart| {
            second.lock().unwrap().push(("second", cart.item_count()));
        });

        engine.add_item(kettle().with_quantity(4));

        assert_eq!(*log.lock().unwrap(), vec![("first", 4), ("second", 4)]);
    }

    #[test]
    fn test_unsubscribe() {
        let mut engine = CartEngine::new(MemoryStorage::new());
        let id = engine.subscribe(|_: &CartEvent, _: &Cart| {});

        assert_eq!(engine.observer_count(), 1);
        assert!(engine.unsubscribe(id));
        assert!(!engine.unsubscribe(id));
        assert_eq!(engine.observer_count(), 0);
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut engine = CartEngine::new(FailingStorage);
        assert!(engine.items().is_empty());

        let event = engine.add_item(kettle());
        assert!(matches!(event, Some(CartEvent::ItemAdded { .. })));
        assert_eq!(engine.subtotal().cents(), 3_500);
    }

    #[test]
    fn test_corrupt_storage_starts_empty() {
        let engine = CartEngine::new(MemoryStorage::with_raw("{\"items\": 12}"));
        assert!(engine.items().is_empty());
        assert!(engine.discount_code().is_none());
    }
}
