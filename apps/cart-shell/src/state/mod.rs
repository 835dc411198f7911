//! # State Module
//!
//! ```text
//! ┌──────────────────────────────┐ ┌──────────────────────────────┐
//! │ CartState                    │ │ ShellConfig                  │
//! │ Arc<Mutex<CartEngine>>       │ │ storage / session / display  │
//! │ mutated by every command     │ │ read-only after startup      │
//! └──────────────────────────────┘ └──────────────────────────────┘
//! ```
//!
//! Handlers take only the state they need.

pub mod cart;
pub mod config;

pub use cart::{CartState, SharedEngine};
pub use config::ShellConfig;
