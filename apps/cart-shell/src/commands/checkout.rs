//! # Checkout Commands
//!
//! Hands the cart to checkout as a flat, pre-computed summary. Payment and
//! order creation happen downstream; nothing here mutates the cart.

use bazaar_core::{LineId, Money};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{CartState, ShellConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub lines: Vec<CheckoutLine>,
    pub item_count: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub discount_code: Option<String>,
    pub discount_amount: Money,
    pub total: Money,
    pub currency_code: String,
    pub formatted_total: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub line_id: LineId,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub total_price: Money,
}

/// Builds the checkout hand-off for the current cart.
///
/// ## Errors
/// `CART_ERROR` when the cart is empty.
pub fn checkout_summary(cart: &CartState, config: &ShellConfig) -> Result<CheckoutSummary, ApiError> {
    debug!("checkout_summary command");

    let summary = cart.with_cart(|engine| {
        let cart = engine.cart();
        if cart.is_empty() {
            return None;
        }

        let lines = cart
            .items()
            .iter()
            .map(|item| CheckoutLine {
                line_id: item.id().clone(),
                name: item.display_name(),
                quantity: item.quantity(),
                unit_price: item.unit_price(),
                total_price: item.total_price(),
            })
            .collect();

        Some(CheckoutSummary {
            lines,
            item_count: cart.item_count(),
            subtotal: cart.subtotal(),
            tax: cart.tax(),
            discount_code: cart.discount_code().map(str::to_string),
            discount_amount: cart.discount_amount(),
            total: cart.total(),
            currency_code: config.display.currency_code.clone(),
            formatted_total: config.format_currency(cart.total()),
        })
    });

    let summary = summary.ok_or_else(|| ApiError::cart("Cart is empty"))?;

    info!(
        lines = summary.lines.len(),
        total = %summary.total,
        "Checkout summary prepared"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use bazaar_core::{CartEngine, CartEntry, CartStorage, MemoryStorage, ProductRef};

    fn cart_state() -> CartState {
        let storage: Box<dyn CartStorage + Send> = Box::new(MemoryStorage::new());
        CartState::new(CartEngine::new(storage))
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let err = checkout_summary(&cart_state(), &ShellConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CartError);
    }

    #[test]
    fn test_summary_matches_cart() {
        let cart = cart_state();
        cart.with_cart_mut(|engine| {
            engine.add_item(
                CartEntry::product(ProductRef::new("throw", "Linen Throw", Money::from_cents(5_050)))
                    .with_quantity(2),
            );
            engine.apply_discount("WELCOME", Money::from_cents(1_000));
        });

        let summary = checkout_summary(&cart, &ShellConfig::default()).unwrap();

        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].name, "Linen Throw");
        assert_eq!(summary.lines[0].total_price, Money::from_cents(10_100));
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.tax, Money::from_cents(1_010));
        assert_eq!(summary.total, Money::from_cents(10_110));
        assert_eq!(summary.formatted_total, "$101.10");
        assert_eq!(summary.currency_code, "USD");
    }
}
