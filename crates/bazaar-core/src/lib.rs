//! # bazaar-core: Pure Cart Logic for the Bazaar Storefront
//!
//! This crate is the **heart** of the storefront cart. It owns the line
//! items, the applied discount and every derived figure the checkout reads.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Cart Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 UI Collaborators (out of scope)                 │   │
//! │  │   Product card ──► Cart drawer ──► Discount form ──► Checkout   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐  │   │
//! │  │   │  money  │ │ pricing │ │ identity │ │  cart  │ │ engine  │  │   │
//! │  │   │  Money  │ │ line    │ │ LineId   │ │ Cart   │ │ observe │  │   │
//! │  │   │ TaxRate │ │ total   │ │ dedup    │ │ events │ │ persist │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK                             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ CartStorage trait                      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              bazaar-store (SQLite cart slot)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer money and tax rates
//! - [`types`] - Catalog snapshots (product, variant, bundle, add-on, config)
//! - [`identity`] - Line identity keys
//! - [`pricing`] - The line-total pricing function
//! - [`item`] - Cart lines and add-to-cart entries
//! - [`cart`] - The cart state machine and persisted payload
//! - [`engine`] - Observable, persisted cart engine
//! - [`storage`] - Storage adapter trait and in-memory adapters
//! - [`validation`] - Input checks for calling collaborators
//! - [`error`] - Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::{CartEngine, CartEntry, MemoryStorage, Money, ProductRef};
//!
//! let mut engine = CartEngine::new(MemoryStorage::new());
//! let mug = ProductRef::new("mug", "Enamel Mug", Money::from_cents(1000));
//!
//! engine.add_item(CartEntry::product(mug).with_quantity(2));
//!
//! assert_eq!(engine.subtotal().cents(), 2000);
//! assert_eq!(engine.tax().cents(), 200);
//! assert_eq!(engine.total().cents(), 2200);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod engine;
pub mod error;
pub mod identity;
pub mod item;
pub mod money;
pub mod pricing;
pub mod storage;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartEvent, CartTotals, PersistedCart};
pub use engine::{CartEngine, CartObserver, SubscriptionId};
pub use error::{StorageError, StorageResult, ValidationError};
pub use identity::LineId;
pub use item::{CartEntry, CartItem};
pub use money::{Money, TaxRate};
pub use storage::{CartStorage, MemoryStorage, NoopStorage};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Flat tax rate applied to the cart subtotal (10%).
///
/// There is no jurisdiction-aware logic in the cart; checkout receives the
/// figure as-is.
pub const CART_TAX_RATE: TaxRate = TaxRate::from_bps(1000);

/// Marker used in the identity key when a line has no variant.
pub const DEFAULT_VARIANT_MARKER: &str = "default";

/// Name of the durable storage slot the cart is persisted under.
pub const DEFAULT_CART_SLOT: &str = "cart-storage";

/// Maximum quantity a collaborator may request for a single line.
///
/// Enforced by [`validation::validate_quantity`], not by the engine.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum number of distinct lines a collaborator should let a cart grow to.
pub const MAX_CART_LINES: usize = 100;
