//! # Commands Module
//!
//! Every command the host UI can send, one JSON object per line.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (protocol + dispatch)
//! ├── cart.rs      ◄─── Cart manipulation
//! └── checkout.rs  ◄─── Checkout hand-off
//! ```
//!
//! ## Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  stdin:                                                                 │
//! │  {"id":7,"command":"update_quantity","lineId":"mug-default-[]",         │
//! │   "quantity":3}                                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Request::parse ──► Command::UpdateQuantity { line_id, quantity }       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  dispatch(&CartState, &ShellConfig, command)                            │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  stdout:                                                                │
//! │  {"id":7,"ok":true,"data":{"items":[...],"totals":{...},...}}           │
//! │  {"id":8,"ok":false,"error":{"code":"VALIDATION_ERROR","message":..}}   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod checkout;

use bazaar_core::{
    AddonSelection, BundleRef, ConfigSelection, LineId, Money, ProductRef, VariantRef,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::{CartState, ShellConfig};

// =============================================================================
// Commands
// =============================================================================

/// A command from the host UI.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(
    tag = "command",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    GetCart,
    AddProduct {
        product: ProductRef,
        #[serde(default)]
        variant: Option<VariantRef>,
        #[serde(default)]
        quantity: Option<i64>,
        #[serde(default)]
        addons: Vec<AddonSelection>,
        #[serde(default)]
        configs: Vec<ConfigSelection>,
        #[serde(default)]
        unit_price: Option<Money>,
    },
    AddBundle {
        bundle: BundleRef,
        #[serde(default)]
        quantity: Option<i64>,
        #[serde(default)]
        addons: Vec<AddonSelection>,
        #[serde(default)]
        configs: Vec<ConfigSelection>,
        #[serde(default)]
        unit_price: Option<Money>,
    },
    UpdateQuantity {
        line_id: LineId,
        quantity: i64,
    },
    UpdateAddons {
        line_id: LineId,
        addons: Vec<AddonSelection>,
    },
    RemoveItem {
        line_id: LineId,
    },
    ClearCart,
    ApplyDiscount {
        code: String,
        amount: Money,
    },
    RemoveDiscount,
    OpenCart,
    CloseCart,
    ToggleCart,
    CheckoutSummary,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetCart => "get_cart",
            Command::AddProduct { .. } => "add_product",
            Command::AddBundle { .. } => "add_bundle",
            Command::UpdateQuantity { .. } => "update_quantity",
            Command::UpdateAddons { .. } => "update_addons",
            Command::RemoveItem { .. } => "remove_item",
            Command::ClearCart => "clear_cart",
            Command::ApplyDiscount { .. } => "apply_discount",
            Command::RemoveDiscount => "remove_discount",
            Command::OpenCart => "open_cart",
            Command::CloseCart => "close_cart",
            Command::ToggleCart => "toggle_cart",
            Command::CheckoutSummary => "checkout_summary",
        }
    }
}

// =============================================================================
// Request / Response Envelope
// =============================================================================

/// One parsed request line.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Correlation id, echoed back verbatim. Any JSON value.
    pub id: Option<Value>,
    pub command: Command,
}

impl Request {
    /// Parses a request line.
    ///
    /// On failure the correlation id is still returned when it could be read.
    pub fn parse(line: &str) -> Result<Request, (Option<Value>, ApiError)> {
        let value: Value = serde_json::from_str(line).map_err(|e| (None, ApiError::from(e)))?;
        let id = value.get("id").cloned();

        match serde_json::from_value::<Command>(value) {
            Ok(command) => Ok(Request { id, command }),
            Err(e) => Err((id, ApiError::from(e))),
        }
    }
}

/// One response line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl Response {
    pub fn success(id: Option<Value>, data: Value) -> Self {
        Response {
            id,
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(id: Option<Value>, error: ApiError) -> Self {
        Response {
            id,
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Runs one command and serializes its result.
pub fn dispatch(cart: &CartState, config: &ShellConfig, command: Command) -> Result<Value, ApiError> {
    match command {
        Command::GetCart => to_value(cart::get_cart(cart, config)),
        Command::AddProduct {
            product,
            variant,
            quantity,
            addons,
            configs,
            unit_price,
        } => {
            let request = cart::AddLineRequest {
                quantity,
                addons,
                configs,
                unit_price,
            };
            to_value(cart::add_product(cart, config, product, variant, request)?)
        }
        Command::AddBundle {
            bundle,
            quantity,
            addons,
            configs,
            unit_price,
        } => {
            let request = cart::AddLineRequest {
                quantity,
                addons,
                configs,
                unit_price,
            };
            to_value(cart::add_bundle(cart, config, bundle, request)?)
        }
        Command::UpdateQuantity { line_id, quantity } => {
            to_value(cart::update_quantity(cart, config, line_id, quantity)?)
        }
        Command::UpdateAddons { line_id, addons } => {
            to_value(cart::update_addons(cart, config, line_id, addons)?)
        }
        Command::RemoveItem { line_id } => to_value(cart::remove_item(cart, config, line_id)),
        Command::ClearCart => to_value(cart::clear_cart(cart, config)),
        Command::ApplyDiscount { code, amount } => {
            to_value(cart::apply_discount(cart, config, code, amount)?)
        }
        Command::RemoveDiscount => to_value(cart::remove_discount(cart, config)),
        Command::OpenCart => to_value(cart::open_cart(cart, config)),
        Command::CloseCart => to_value(cart::close_cart(cart, config)),
        Command::ToggleCart => to_value(cart::toggle_cart(cart, config)),
        Command::CheckoutSummary => to_value(checkout::checkout_summary(cart, config)?),
    }
}

fn to_value<T: Serialize>(value: T) -> Result<Value, ApiError> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}
