//! # Bazaar Cart Shell
//!
//! Hosts one cart engine per process and drives it from a line-oriented
//! JSON protocol on stdin/stdout. The storefront UI (or a test harness)
//! spawns `bazaar-cart` and talks to it like any other child process.
//!
//! ## Module Organization
//! ```text
//! bazaar_cart_shell/
//! ├── lib.rs          ◄─── You are here (startup, serve loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cart.rs     ◄─── Shared cart engine
//! │   └── config.rs   ◄─── File + env configuration
//! ├── commands/
//! │   ├── mod.rs      ◄─── Protocol types and dispatch
//! │   ├── cart.rs     ◄─── Cart manipulation commands
//! │   └── checkout.rs ◄─── Checkout summary
//! └── error.rs        ◄─── API and startup error types
//! ```
//!
//! stdout carries protocol responses only. Logs go to stderr.

pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use bazaar_core::{Cart, CartEngine, CartEvent, CartStorage};
use bazaar_store::{new_session_id, Database, QueuedCartStorage, StoreConfig};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use commands::{Request, Response};
use error::{ApiError, ShellError};
use state::{CartState, ShellConfig};

/// Runs the shell until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Shell Startup                                     │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr             │
/// │     • Default: INFO, can be overridden with RUST_LOG                    │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults ◄── cart.toml ◄── BAZAAR_* env vars                      │
/// │                                                                         │
/// │  3. Open Storage ─────────────────────────────────────────────────────► │
/// │     • SQLite (WAL) or in-memory, migrations applied                     │
/// │     • QueuedCartStorage preloads the cart slot, spawns its writer       │
/// │                                                                         │
/// │  4. Rehydrate Engine ─────────────────────────────────────────────────► │
/// │     • CartEngine::new loads the slot; corrupt payloads start empty      │
/// │                                                                         │
/// │  5. Serve ────────────────────────────────────────────────────────────► │
/// │     • one JSON command per stdin line, one response per stdout line     │
/// │                                                                         │
/// │  6. Shut Down ────────────────────────────────────────────────────────► │
/// │     • drain the write queue, close the pool                             │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), ShellError> {
    init_tracing();

    info!("Starting Bazaar cart shell");

    let config = ShellConfig::load(None)?;

    let store_config = if config.storage.in_memory {
        StoreConfig::in_memory()
    } else {
        StoreConfig::new(config.database_path()?)
    };
    let db = Database::new(store_config).await?;
    info!("Cart database connected and migrations applied");

    let session_id = config.session.id.clone().unwrap_or_else(new_session_id);
    let storage = QueuedCartStorage::open(&db, config.storage.cart_slot.clone(), session_id.clone())
        .await
        .map(Arc::new)?;
    info!(slot = %storage.slot(), session = %session_id, "Cart storage opened");

    let engine_storage: Box<dyn CartStorage + Send> = Box::new(Arc::clone(&storage));
    let mut engine = CartEngine::new(engine_storage);
    engine.subscribe(|event: &CartEvent, cart: &Cart| {
        debug!(?event, lines = cart.line_count(), total = %cart.total(), "Cart changed");
    });

    let cart = CartState::new(engine);

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let served = serve(&cart, &config, stdin, stdout).await;

    info!("Input closed, draining cart writes");
    if let Err(e) = storage.shutdown().await {
        warn!(error = %e, "Cart writer did not shut down cleanly");
    }
    db.close().await;

    served
}

/// Reads commands line by line and writes one response per command.
///
/// Blank lines are skipped. A malformed line, including one that is not
/// valid UTF-8, gets a `BAD_REQUEST` response and the loop continues.
pub async fn serve<R, W>(
    cart: &CartState,
    config: &ShellConfig,
    mut input: R,
    mut output: W,
) -> Result<(), ShellError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(text) => {
                let line = text.trim();
                if line.is_empty() {
                    continue;
                }
                handle_line(cart, config, line)
            }
            Err(e) => {
                warn!(error = %e, "Rejected request line that is not UTF-8");
                Response::failure(
                    None,
                    ApiError::bad_request(format!("Request line is not valid UTF-8: {}", e)),
                )
            }
        };

        let mut encoded = serde_json::to_vec(&response).map_err(std::io::Error::from)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
        output.flush().await?;
    }

    Ok(())
}

fn handle_line(cart: &CartState, config: &ShellConfig, line: &str) -> Response {
    match Request::parse(line) {
        Ok(Request { id, command }) => {
            let name = command.name();
            match commands::dispatch(cart, config, command) {
                Ok(data) => Response::success(id, data),
                Err(err) => {
                    debug!(command = name, error = %err, "Command failed");
                    Response::failure(id, err)
                }
            }
        }
        Err((id, err)) => {
            warn!(error = %err, "Rejected request line");
            Response::failure(id, err)
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bazaar=trace` - Show trace for bazaar crates only
/// - Default: INFO, with debug for bazaar crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bazaar=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::MemoryStorage;
    use serde_json::Value;

    fn cart_state() -> CartState {
        let storage: Box<dyn CartStorage + Send> = Box::new(MemoryStorage::new());
        CartState::new(CartEngine::new(storage))
    }

    async fn run_lines(input: &str) -> Vec<Value> {
        run_bytes(input.as_bytes()).await
    }

    async fn run_bytes(input: &[u8]) -> Vec<Value> {
        let cart = cart_state();
        let config = ShellConfig::default();
        let mut output = Vec::new();

        serve(&cart, &config, input, &mut output)
            .await
            .unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_serve_round_trip() {
        let responses = run_lines(concat!(
            r#"{"id":1,"command":"add_product","product":{"id":"lamp","name":"Desk Lamp","price":12900}}"#,
            "\n",
            "\n",
            r#"{"id":2,"command":"add_bundle","bundle":{"id":"throw-set","name":"Linen Throw","price":5050},"quantity":2}"#,
            "\n",
            r#"{"id":"last","command":"checkout_summary"}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["ok"], true);
        assert_eq!(responses[1]["data"]["totals"]["subtotal"], 23_000);

        let summary = &responses[2];
        assert_eq!(summary["id"], "last");
        assert_eq!(summary["data"]["tax"], 2_300);
        assert_eq!(summary["data"]["total"], 25_300);
        assert_eq!(summary["data"]["formattedTotal"], "$253.00");
    }

    #[tokio::test]
    async fn test_serve_reports_errors_and_continues() {
        let responses = run_lines(concat!(
            "{not json\n",
            r#"{"id":5,"command":"checkout_summary"}"#,
            "\n",
            r#"{"id":6,"command":"get_cart"}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["ok"], false);
        assert_eq!(responses[0]["error"]["code"], "BAD_REQUEST");
        assert_eq!(responses[1]["id"], 5);
        assert_eq!(responses[1]["error"]["code"], "CART_ERROR");
        assert_eq!(responses[2]["ok"], true);
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8() {
        let responses = run_bytes(b"\xff\xfe\n{\"id\":2,\"command\":\"get_cart\"}\n").await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["ok"], false);
        assert_eq!(responses[0]["error"]["code"], "BAD_REQUEST");
        assert!(responses[0].get("id").is_none());
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["ok"], true);
    }

    #[tokio::test]
    async fn test_serve_handles_missing_trailing_newline() {
        let responses = run_lines(r#"{"id":9,"command":"get_cart"}"#).await;

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 9);
    }
}
