//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ```text
//! QueuedCartStorage writer task
//!      │  db.cart_slots().upsert("cart-storage", payload, session)
//!      ▼
//! CartSlotRepository
//! ├── get(&self, slot)
//! ├── upsert(&self, slot, payload, written_by)
//! ├── delete(&self, slot)
//! └── list(&self)
//!      │  SQL
//!      ▼
//! SQLite: cart_slots
//! ```
//!
//! ## Available Repositories
//!
//! - [`cart_slot::CartSlotRepository`] - Named cart payload slots

pub mod cart_slot;
