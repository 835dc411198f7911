//! # Cart Commands
//!
//! Commands for cart manipulation. Every handler validates its input first,
//! then runs exactly one engine mutation under the cart lock.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐                        │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │                        │
//! │  │  Cart    │     │          │     │ Summary  │                        │
//! │  └──────────┘     └──────────┘     └──────────┘                        │
//! │                        │                                                │
//! │                   add_product       apply_discount                     │
//! │                   add_bundle        remove_discount                    │
//! │                   update_quantity   update_addons                      │
//! │                   remove_item                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bazaar_core::validation::{
    validate_cart_size, validate_catalog_id, validate_discount_amount, validate_discount_code,
    validate_price_cents, validate_quantity,
};
use bazaar_core::{
    AddonSelection, BundleRef, Cart, CartEntry, CartItem, CartTotals, ConfigSelection, LineId,
    Money, ProductRef, ValidationError, VariantRef, MAX_ITEM_QUANTITY,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::{CartState, ShellConfig};

/// Cart response including items, totals and display strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartItem>,
    pub totals: CartTotals,
    pub is_open: bool,
    pub discount_code: Option<String>,
    pub display: DisplayTotals,
}

/// Totals formatted with the configured currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTotals {
    pub subtotal: String,
    pub tax: String,
    pub discount: String,
    pub total: String,
}

impl CartResponse {
    pub fn new(cart: &Cart, config: &ShellConfig) -> Self {
        let totals = cart.totals();
        CartResponse {
            items: cart.items().to_vec(),
            totals,
            is_open: cart.is_open(),
            discount_code: cart.discount_code().map(str::to_string),
            display: DisplayTotals {
                subtotal: config.format_currency(totals.subtotal),
                tax: config.format_currency(totals.tax),
                discount: config.format_currency(totals.discount),
                total: config.format_currency(totals.total),
            },
        }
    }
}

/// The optional parts of an add-to-cart request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddLineRequest {
    /// Defaults to 1.
    pub quantity: Option<i64>,
    pub addons: Vec<AddonSelection>,
    pub configs: Vec<ConfigSelection>,
    /// Overrides the catalog price (sale price, member price).
    pub unit_price: Option<Money>,
}

/// Gets the current cart contents.
///
/// ```text
/// ┌────────────────────────────────────────────────────────────────┐
/// │  CART                                              3 items     │
/// ├────────────────────────────────────────────────────────────────┤
/// │  Desk Lamp - Brass       x1   (+ bulb x1)       $129.00        │
/// │  Linen Throw             x2                     $101.00        │
/// ├────────────────────────────────────────────────────────────────┤
/// │  Subtotal                                       $230.00        │
/// │  Tax (10%)                                       $23.00        │
/// │  ──────────────────────────────────────────────────            │
/// │  TOTAL                                          $253.00        │
/// └────────────────────────────────────────────────────────────────┘
/// ```
pub fn get_cart(cart: &CartState, config: &ShellConfig) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|engine| CartResponse::new(engine.cart(), config))
}

/// Adds a product (optionally a specific variant) to the cart.
///
/// ## Behavior
/// - Same product, variant and configs as an existing line: quantity merges
/// - Otherwise: added as a new line
/// - Price is frozen at the time of adding
/// - Always opens the cart drawer
pub fn add_product(
    cart: &CartState,
    config: &ShellConfig,
    product: ProductRef,
    variant: Option<VariantRef>,
    request: AddLineRequest,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product.id, variant = ?variant.as_ref().map(|v| &v.id), "add_product command");

    validate_catalog_id("product id", &product.id)?;
    validate_price_cents(product.price.cents())?;

    let mut entry = CartEntry::product(product);
    if let Some(variant) = variant {
        validate_catalog_id("variant id", &variant.id)?;
        validate_price_cents(variant.price.cents())?;
        entry = entry.with_variant(variant);
    }

    add_entry(cart, config, entry, request)
}

/// Adds a bundle to the cart. Same merge rules as products.
pub fn add_bundle(
    cart: &CartState,
    config: &ShellConfig,
    bundle: BundleRef,
    request: AddLineRequest,
) -> Result<CartResponse, ApiError> {
    debug!(bundle_id = %bundle.id, "add_bundle command");

    validate_catalog_id("bundle id", &bundle.id)?;
    validate_price_cents(bundle.price.cents())?;

    add_entry(cart, config, CartEntry::bundle(bundle), request)
}

fn add_entry(
    cart: &CartState,
    config: &ShellConfig,
    mut entry: CartEntry,
    request: AddLineRequest,
) -> Result<CartResponse, ApiError> {
    let quantity = request.quantity.unwrap_or(1);
    validate_quantity(quantity)?;
    validate_addons(&request.addons)?;
    for selection in &request.configs {
        validate_catalog_id("config id", &selection.config_id)?;
    }
    if let Some(unit_price) = request.unit_price {
        validate_price_cents(unit_price.cents())?;
        entry = entry.with_unit_price(unit_price);
    }

    entry.quantity = quantity;
    entry.selected_addons = request.addons;
    entry.selected_configs = request.configs;

    let line_id = entry.line_id();
    cart.with_cart_mut(|engine| -> Result<CartResponse, ApiError> {
        match engine.item(&line_id) {
            Some(existing) => {
                let merged = existing.quantity().saturating_add(quantity);
                if merged > MAX_ITEM_QUANTITY {
                    return Err(ValidationError::OutOfRange {
                        field: "quantity".to_string(),
                        min: 1,
                        max: MAX_ITEM_QUANTITY,
                    }
                    .into());
                }
            }
            None => validate_cart_size(engine.cart().line_count())?,
        }

        engine.add_item(entry);
        Ok(CartResponse::new(engine.cart(), config))
    })
}

/// Updates the quantity of a line.
///
/// ## Behavior
/// - Quantity 0 or below: removes the line
/// - Quantity above the maximum: returns error
/// - Unknown line: cart returned unchanged
pub fn update_quantity(
    cart: &CartState,
    config: &ShellConfig,
    line_id: LineId,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(line = %line_id, quantity = %quantity, "update_quantity command");

    if quantity > 0 {
        validate_quantity(quantity)?;
    }

    Ok(cart.with_cart_mut(|engine| {
        engine.update_quantity(&line_id, quantity);
        CartResponse::new(engine.cart(), config)
    }))
}

/// Replaces the add-on selection of a line. Quantity and configs are kept.
pub fn update_addons(
    cart: &CartState,
    config: &ShellConfig,
    line_id: LineId,
    addons: Vec<AddonSelection>,
) -> Result<CartResponse, ApiError> {
    debug!(line = %line_id, addons = addons.len(), "update_addons command");

    validate_addons(&addons)?;

    Ok(cart.with_cart_mut(|engine| {
        engine.update_addons(&line_id, addons);
        CartResponse::new(engine.cart(), config)
    }))
}

/// Removes a line from the cart.
pub fn remove_item(cart: &CartState, config: &ShellConfig, line_id: LineId) -> CartResponse {
    debug!(line = %line_id, "remove_item command");

    cart.with_cart_mut(|engine| {
        engine.remove_item(&line_id);
        CartResponse::new(engine.cart(), config)
    })
}

/// Clears all lines and any discount.
pub fn clear_cart(cart: &CartState, config: &ShellConfig) -> CartResponse {
    debug!("clear_cart command");

    cart.with_cart_mut(|engine| {
        engine.clear_cart();
        CartResponse::new(engine.cart(), config)
    })
}

/// Applies a discount code with a fixed amount, replacing any previous one.
///
/// The code is normalized to upper case. Code lookup happens upstream; the
/// amount arrives already resolved.
pub fn apply_discount(
    cart: &CartState,
    config: &ShellConfig,
    code: String,
    amount: Money,
) -> Result<CartResponse, ApiError> {
    debug!(code = %code, amount = %amount, "apply_discount command");

    let code = validate_discount_code(&code)?;
    validate_discount_amount(amount.cents())?;

    Ok(cart.with_cart_mut(|engine| {
        engine.apply_discount(code, amount);
        CartResponse::new(engine.cart(), config)
    }))
}

pub fn remove_discount(cart: &CartState, config: &ShellConfig) -> CartResponse {
    debug!("remove_discount command");

    cart.with_cart_mut(|engine| {
        engine.remove_discount();
        CartResponse::new(engine.cart(), config)
    })
}

pub fn open_cart(cart: &CartState, config: &ShellConfig) -> CartResponse {
    cart.with_cart_mut(|engine| {
        engine.open_cart();
        CartResponse::new(engine.cart(), config)
    })
}

pub fn close_cart(cart: &CartState, config: &ShellConfig) -> CartResponse {
    cart.with_cart_mut(|engine| {
        engine.close_cart();
        CartResponse::new(engine.cart(), config)
    })
}

pub fn toggle_cart(cart: &CartState, config: &ShellConfig) -> CartResponse {
    cart.with_cart_mut(|engine| {
        engine.toggle_cart();
        CartResponse::new(engine.cart(), config)
    })
}

fn validate_addons(addons: &[AddonSelection]) -> Result<(), ValidationError> {
    for selection in addons {
        validate_catalog_id("addon id", &selection.addon.id)?;
        validate_price_cents(selection.addon.price.cents())?;
        validate_quantity(selection.quantity)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_core::{AddonRef, CartEngine, CartStorage, MemoryStorage, MAX_CART_LINES};

    fn cart_state() -> CartState {
        let storage: Box<dyn CartStorage + Send> = Box::new(MemoryStorage::new());
        CartState::new(CartEngine::new(storage))
    }

    fn lamp() -> ProductRef {
        ProductRef::new("lamp", "Desk Lamp", Money::from_cents(12_000))
    }

    fn bulb(quantity: i64) -> AddonSelection {
        AddonSelection::new(AddonRef::new("bulb", "Spare Bulb", Money::from_cents(900)), quantity)
    }

    #[test]
    fn test_add_product_defaults_to_one_and_opens() {
        let cart = cart_state();
        let config = ShellConfig::default();

        let response =
            add_product(&cart, &config, lamp(), None, AddLineRequest::default()).unwrap();

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.totals.item_count, 1);
        assert!(response.is_open);
        assert_eq!(response.display.subtotal, "$120.00");
        assert_eq!(response.display.tax, "$12.00");
    }

    #[test]
    fn test_add_product_with_addons_and_variant() {
        let cart = cart_state();
        let config = ShellConfig::default();
        let brass = VariantRef::new("brass", "Brass", Money::from_cents(12_000));

        let request = AddLineRequest {
            addons: vec![bulb(1)],
            ..AddLineRequest::default()
        };
        let response = add_product(&cart, &config, lamp(), Some(brass), request).unwrap();

        let line = &response.items[0];
        assert_eq!(line.id().as_str(), "lamp-brass-[]");
        assert_eq!(line.total_price(), Money::from_cents(12_900));
        assert_eq!(line.display_name(), "Desk Lamp - Brass");
    }

    #[test]
    fn test_add_rejects_invalid_input() {
        let cart = cart_state();
        let config = ShellConfig::default();

        let zero = AddLineRequest {
            quantity: Some(0),
            ..AddLineRequest::default()
        };
        let err = add_product(&cart, &config, lamp(), None, zero).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let blank = ProductRef::new("  ", "Nothing", Money::from_cents(100));
        assert!(add_product(&cart, &config, blank, None, AddLineRequest::default()).is_err());

        let bad_addon = AddLineRequest {
            addons: vec![bulb(-1)],
            ..AddLineRequest::default()
        };
        assert!(add_product(&cart, &config, lamp(), None, bad_addon).is_err());

        assert_eq!(get_cart(&cart, &config).items.len(), 0);
    }

    #[test]
    fn test_merge_is_capped() {
        let cart = cart_state();
        let config = ShellConfig::default();

        let many = AddLineRequest {
            quantity: Some(MAX_ITEM_QUANTITY),
            ..AddLineRequest::default()
        };
        add_product(&cart, &config, lamp(), None, many).unwrap();

        let err = add_product(&cart, &config, lamp(), None, AddLineRequest::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(get_cart(&cart, &config).totals.item_count, MAX_ITEM_QUANTITY);
    }

    #[test]
    fn test_cart_full() {
        let cart = cart_state();
        let config = ShellConfig::default();

        for n in 0..MAX_CART_LINES {
            let product = ProductRef::new(format!("p{}", n), "Thing", Money::from_cents(100));
            add_product(&cart, &config, product, None, AddLineRequest::default()).unwrap();
        }

        let extra = ProductRef::new("one-more", "Thing", Money::from_cents(100));
        let err = add_product(&cart, &config, extra, None, AddLineRequest::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);

        // Merging onto an existing line still works when full.
        let again = ProductRef::new("p0", "Thing", Money::from_cents(100));
        assert!(add_product(&cart, &config, again, None, AddLineRequest::default()).is_ok());
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let cart = cart_state();
        let config = ShellConfig::default();
        add_product(&cart, &config, lamp(), None, AddLineRequest::default()).unwrap();

        let response =
            update_quantity(&cart, &config, LineId::from("lamp-default-[]"), 0).unwrap();
        assert!(response.items.is_empty());

        let err = update_quantity(&cart, &config, LineId::from("lamp-default-[]"), 1_000)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_update_addons() {
        let cart = cart_state();
        let config = ShellConfig::default();
        let request = AddLineRequest {
            quantity: Some(2),
            ..AddLineRequest::default()
        };
        add_product(&cart, &config, lamp(), None, request).unwrap();

        let response =
            update_addons(&cart, &config, LineId::from("lamp-default-[]"), vec![bulb(2)]).unwrap();

        // 12000*2 + 900*2*2
        assert_eq!(response.totals.subtotal, Money::from_cents(27_600));
    }

    #[test]
    fn test_discount_commands() {
        let cart = cart_state();
        let config = ShellConfig::default();
        add_product(&cart, &config, lamp(), None, AddLineRequest::default()).unwrap();

        let response =
            apply_discount(&cart, &config, " welcome10 ".to_string(), Money::from_cents(1_000))
                .unwrap();
        assert_eq!(response.discount_code.as_deref(), Some("WELCOME10"));
        assert_eq!(response.totals.total, Money::from_cents(12_200));
        assert_eq!(response.display.discount, "$10.00");

        let err = apply_discount(&cart, &config, "SAVE".to_string(), Money::from_cents(-5))
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let response = remove_discount(&cart, &config);
        assert!(response.discount_code.is_none());
        assert_eq!(response.totals.total, Money::from_cents(13_200));
    }

    #[test]
    fn test_drawer_commands() {
        let cart = cart_state();
        let config = ShellConfig::default();

        assert!(open_cart(&cart, &config).is_open);
        assert!(!close_cart(&cart, &config).is_open);
        assert!(toggle_cart(&cart, &config).is_open);
    }

    #[test]
    fn test_clear_and_remove() {
        let cart = cart_state();
        let config = ShellConfig::default();
        let throw = BundleRef::new("throw-set", "Linen Throw Set", Money::from_cents(5_050));

        add_product(&cart, &config, lamp(), None, AddLineRequest::default()).unwrap();
        add_bundle(&cart, &config, throw, AddLineRequest::default()).unwrap();

        let response = remove_item(&cart, &config, LineId::from("lamp-default-[]"));
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].id().as_str(), "throw-set-default-[]");

        assert!(clear_cart(&cart, &config).items.is_empty());
    }
}
