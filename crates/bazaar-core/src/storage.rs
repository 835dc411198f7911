//! # Storage Adapter
//!
//! The seam between the pure cart and whatever keeps it across restarts.
//!
//! ```text
//! CartEngine ── save(&PersistedCart) ──► CartStorage ──► SQLite slot (bazaar-store)
//!            ◄─ load() ─────────────────               ──► MemoryStorage (tests)
//!                                                      ──► NoopStorage
//! ```
//!
//! Adapters are synchronous from the engine's point of view. Backends with
//! slow I/O queue the write and return (see `bazaar_store::QueuedCartStorage`).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::cart::PersistedCart;
use crate::error::{StorageError, StorageResult};

/// A durable home for the cart payload.
///
/// `load` returning `Ok(None)` means nothing was ever saved.
pub trait CartStorage {
    fn load(&self) -> StorageResult<Option<PersistedCart>>;

    fn save(&self, cart: &PersistedCart) -> StorageResult<()>;
}

impl<T: CartStorage + ?Sized> CartStorage for &T {
    fn load(&self) -> StorageResult<Option<PersistedCart>> {
        (**self).load()
    }

    fn save(&self, cart: &PersistedCart) -> StorageResult<()> {
        (**self).save(cart)
    }
}

impl<T: CartStorage + ?Sized> CartStorage for Box<T> {
    fn load(&self) -> StorageResult<Option<PersistedCart>> {
        (**self).load()
    }

    fn save(&self, cart: &PersistedCart) -> StorageResult<()> {
        (**self).save(cart)
    }
}

impl<T: CartStorage + ?Sized> CartStorage for Arc<T> {
    fn load(&self) -> StorageResult<Option<PersistedCart>> {
        (**self).load()
    }

    fn save(&self, cart: &PersistedCart) -> StorageResult<()> {
        (**self).save(cart)
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// Keeps the serialized payload in memory.
///
/// Stores the JSON text rather than the struct so a round trip goes through
/// the same encoding a durable backend would use.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    payload: Mutex<Option<String>>,
    saves: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a raw payload, valid or not.
    pub fn with_raw(payload: impl Into<String>) -> Self {
        MemoryStorage {
            payload: Mutex::new(Some(payload.into())),
            saves: AtomicUsize::new(0),
        }
    }

    /// The raw payload as last written.
    pub fn raw(&self) -> Option<String> {
        self.payload.lock().ok().and_then(|guard| guard.clone())
    }

    /// How many successful saves this adapter has seen.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Option<PersistedCart>> {
        let guard = self
            .payload
            .lock()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()))?;

        guard.as_deref().map(PersistedCart::from_json).transpose()
    }

    fn save(&self, cart: &PersistedCart) -> StorageResult<()> {
        let json = cart.to_json()?;
        let mut guard = self
            .payload
            .lock()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".to_string()))?;

        *guard = Some(json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// Noop Storage
// =============================================================================

/// Forgets everything. For carts that must not outlive the session.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopStorage;

impl CartStorage for NoopStorage {
    fn load(&self) -> StorageResult<Option<PersistedCart>> {
        Ok(None)
    }

    fn save(&self, _cart: &PersistedCart) -> StorageResult<()> {
        Ok(())
    }
}
