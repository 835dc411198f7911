//! # Bazaar Cart Entry Point
//!
//! ```text
//! ┌──────────────────────┐   JSON lines    ┌──────────────────────────────┐
//! │  Storefront UI /     │ ──── stdin ───► │  bazaar-cart                 │
//! │  test harness        │ ◄─── stdout ─── │  CartEngine + SQLite slot    │
//! └──────────────────────┘                 └──────────────────────────────┘
//!                                                 │ stderr
//!                                                 ▼
//!                                               logs
//! ```
//!
//! The actual setup is in lib.rs so it can be tested.

#[tokio::main]
async fn main() {
    if let Err(e) = bazaar_cart_shell::run().await {
        tracing::error!(error = %e, "Cart shell failed");
        eprintln!("bazaar-cart: {}", e);
        std::process::exit(1);
    }
}
