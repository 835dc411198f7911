//! # Queued Cart Storage
//!
//! Implements the synchronous `CartStorage` trait on top of async SQLite.
//!
//! ## Ordered Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      One Writer Per Slot                                │
//! │                                                                         │
//! │  CartEngine (sync)                                                      │
//! │     save(s1) ─┐                                                         │
//! │     save(s2) ─┼─► unbounded mpsc ──► SlotWriter task ──► cart_slots     │
//! │     save(s3) ─┘     (FIFO)             upsert s1, s2, s3 in order       │
//! │                                                                         │
//! │  flush()    ─► Flush(ack)    → acked once everything before it landed  │
//! │  shutdown() ─► Shutdown(ack) → drains, stops; later saves are Closed   │
//! │                                                                         │
//! │  A single consumer means an earlier snapshot can never reach the       │
//! │  database after a later one.                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `load()` serves the most recent snapshot from memory: the one read at
//! `open` time, or the last one handed to `save`.

use std::sync::Mutex;

use bazaar_core::{CartStorage, PersistedCart, StorageError, StorageResult};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::pool::Database;
use crate::repository::cart_slot::CartSlotRepository;

// =============================================================================
// Writer Task
// =============================================================================

enum WriteCommand {
    Save(String),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// Drains the queue and writes each payload to the slot.
struct SlotWriter {
    repo: CartSlotRepository,
    slot: String,
    session_id: String,
    rx: mpsc::UnboundedReceiver<WriteCommand>,
}

impl SlotWriter {
    async fn run(mut self) {
        info!(slot = %self.slot, session = %self.session_id, "Cart writer starting");

        while let Some(command) = self.rx.recv().await {
            match command {
                WriteCommand::Save(payload) => self.write(&payload).await,
                WriteCommand::Flush(ack) => {
                    let _ = ack.send(());
                }
                WriteCommand::Shutdown(ack) => {
                    let _ = ack.send(());
                    break;
                }
            }
        }

        info!(slot = %self.slot, "Cart writer stopped");
    }

    async fn write(&self, payload: &str) {
        match self.repo.upsert(&self.slot, payload, &self.session_id).await {
            Ok(Some(previous)) if previous != self.session_id => {
                warn!(
                    slot = %self.slot,
                    previous_writer = %previous,
                    "Overwrote cart slot last written by another session"
                );
            }
            Ok(_) => debug!(slot = %self.slot, "Cart snapshot persisted"),
            Err(e) => error!(slot = %self.slot, error = %e, "Failed to persist cart snapshot"),
        }
    }
}

// =============================================================================
// Storage Adapter
// =============================================================================

/// `CartStorage` backed by a SQLite slot and a single background writer.
pub struct QueuedCartStorage {
    slot: String,
    tx: mpsc::UnboundedSender<WriteCommand>,
    latest: Mutex<Option<String>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl QueuedCartStorage {
    /// Reads the slot's current payload and starts the writer task.
    ///
    /// Must be called inside a Tokio runtime.
    pub async fn open(
        db: &Database,
        slot: impl Into<String>,
        session_id: impl Into<String>,
    ) -> StoreResult<Self> {
        let slot = slot.into();
        let repo = db.cart_slots();

        let latest = repo.get(&slot).await?.map(|record| record.payload);
        debug!(slot = %slot, found = latest.is_some(), "Opened cart slot");

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = SlotWriter {
            repo,
            slot: slot.clone(),
            session_id: session_id.into(),
            rx,
        };
        let handle = tokio::spawn(writer.run());

        Ok(QueuedCartStorage {
            slot,
            tx,
            latest: Mutex::new(latest),
            writer: Mutex::new(Some(handle)),
        })
    }

    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Waits until every save queued before this call has been written.
    pub async fn flush(&self) -> StoreResult<()> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(WriteCommand::Flush(ack))
            .map_err(|_| StoreError::WriterClosed)?;
        done.await.map_err(|_| StoreError::WriterClosed)
    }

    /// Drains pending writes and stops the writer. Idempotent.
    pub async fn shutdown(&self) -> StoreResult<()> {
        let (ack, done) = oneshot::channel();
        if self.tx.send(WriteCommand::Shutdown(ack)).is_ok() {
            let _ = done.await;
        }

        let handle = self.writer.lock().ok().and_then(|mut guard| guard.take());
        if let Some(handle) = handle {
            handle
                .await
                .map_err(|e| StoreError::Internal(format!("cart writer panicked: {e}")))?;
        }

        Ok(())
    }
}

impl CartStorage for QueuedCartStorage {
    fn load(&self) -> StorageResult<Option<PersistedCart>> {
        let latest = self
            .latest
            .lock()
            .map_err(|_| StorageError::Backend("cart snapshot lock poisoned".to_string()))?;

        latest.as_deref().map(PersistedCart::from_json).transpose()
    }

    fn save(&self, cart: &PersistedCart) -> StorageResult<()> {
        let payload = cart.to_json()?;

        self.tx
            .send(WriteCommand::Save(payload.clone()))
            .map_err(|_| StorageError::from(StoreError::WriterClosed))?;

        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(payload);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::StoreConfig;
    use bazaar_core::{CartEngine, CartEntry, Money, ProductRef};

    async fn db() -> Database {
        Database::new(StoreConfig::in_memory()).await.unwrap()
    }

    fn snapshot(code: &str) -> PersistedCart {
        PersistedCart {
            discount_code: Some(code.to_string()),
            discount_amount: Money::from_cents(100),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_flush_persists_save() {
        let db = db().await;
        let storage = QueuedCartStorage::open(&db, "cart-storage", "s1").await.unwrap();

        storage.save(&snapshot("A")).unwrap();
        storage.flush().await.unwrap();

        let record = db.cart_slots().get("cart-storage").await.unwrap().unwrap();
        assert_eq!(PersistedCart::from_json(&record.payload).unwrap(), snapshot("A"));
        assert_eq!(record.written_by, "s1");
    }

    #[tokio::test]
    async fn test_writes_land_in_order() {
        let db = db().await;
        let storage = QueuedCartStorage::open(&db, "cart-storage", "s1").await.unwrap();

        for n in 0..50 {
            storage.save(&snapshot(&format!("CODE{n}"))).unwrap();
        }
        storage.flush().await.unwrap();

        let record = db.cart_slots().get("cart-storage").await.unwrap().unwrap();
        let stored = PersistedCart::from_json(&record.payload).unwrap();
        assert_eq!(stored.discount_code.as_deref(), Some("CODE49"));
    }

    #[tokio::test]
    async fn test_load_serves_latest_snapshot() {
        let db = db().await;
        let storage = QueuedCartStorage::open(&db, "cart-storage", "s1").await.unwrap();
        assert!(storage.load().unwrap().is_none());

        storage.save(&snapshot("LATEST")).unwrap();
        assert_eq!(storage.load().unwrap(), Some(snapshot("LATEST")));
    }

    #[tokio::test]
    async fn test_open_preloads_existing_slot() {
        let db = db().await;
        db.cart_slots()
            .upsert("cart-storage", &snapshot("EARLIER").to_json().unwrap(), "old-session")
            .await
            .unwrap();

        let storage = QueuedCartStorage::open(&db, "cart-storage", "s2").await.unwrap();
        assert_eq!(storage.load().unwrap(), Some(snapshot("EARLIER")));
    }

    #[tokio::test]
    async fn test_save_after_shutdown_is_closed() {
        let db = db().await;
        let storage = QueuedCartStorage::open(&db, "cart-storage", "s1").await.unwrap();

        storage.save(&snapshot("LAST")).unwrap();
        storage.shutdown().await.unwrap();
        storage.shutdown().await.unwrap();

        assert_eq!(storage.save(&snapshot("LATE")), Err(StorageError::Closed));
        assert!(matches!(storage.flush().await, Err(StoreError::WriterClosed)));

        let record = db.cart_slots().get("cart-storage").await.unwrap().unwrap();
        assert_eq!(PersistedCart::from_json(&record.payload).unwrap(), snapshot("LAST"));
    }

    #[tokio::test]
    async fn test_engine_survives_restart() {
        let db = db().await;

        let storage = QueuedCartStorage::open(&db, "cart-storage", "s1").await.unwrap();
        let mut engine = CartEngine::new(storage);
        engine.add_item(
            CartEntry::product(ProductRef::new("tote", "Tote Bag", Money::from_cents(2_500)))
                .with_quantity(2),
        );
        engine.apply_discount("TOTE", Money::from_cents(500));
        engine.storage().shutdown().await.unwrap();

        let storage = QueuedCartStorage::open(&db, "cart-storage", "s2").await.unwrap();
        let restored = CartEngine::new(storage);

        assert_eq!(restored.item_count(), 2);
        assert_eq!(restored.subtotal().cents(), 5_000);
        assert_eq!(restored.total().cents(), 5_000 + 500 - 500);
        assert!(!restored.is_open());
    }
}
