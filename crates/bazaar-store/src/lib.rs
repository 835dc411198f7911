//! # bazaar-store: Durable Cart Storage
//!
//! Keeps the cart payload in SQLite so a cart survives restarts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Cart Data Flow                            │
//! │                                                                         │
//! │  CartEngine::add_item  (bazaar-core)                                   │
//! │       │ storage.save(snapshot)   ← synchronous, never blocks            │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   bazaar-store (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────────┐   ┌──────────────┐   ┌──────────────┐   │   │
//! │  │   │ QueuedCartStorage│   │ CartSlotRepo │   │  Migrations  │   │   │
//! │  │   │   (writer.rs)    │──►│ (cart_slot)  │   │  (embedded)  │   │   │
//! │  │   │ mpsc → 1 writer  │   │ upsert / get │   │ 001_cart...  │   │   │
//! │  │   └──────────────────┘   └──────┬───────┘   └──────────────┘   │   │
//! │  └──────────────────────────────────┼──────────────────────────────┘   │
//! │                                     ▼                                   │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/bazaar-cart.db  →  cart_slots                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Store error types
//! - [`repository`] - Cart slot repository
//! - [`writer`] - Ordered write queue implementing `CartStorage`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_core::CartEngine;
//! use bazaar_store::{new_session_id, Database, QueuedCartStorage, StoreConfig};
//!
//! let db = Database::new(StoreConfig::new("bazaar-cart.db")).await?;
//! let storage = QueuedCartStorage::open(&db, "cart-storage", new_session_id()).await?;
//! let mut engine = CartEngine::new(storage);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{StoreError, StoreResult};
pub use pool::{Database, StoreConfig};
pub use repository::cart_slot::{CartSlotRecord, CartSlotRepository};
pub use writer::QueuedCartStorage;

/// Generates a fresh writer identity for a session.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
