//! # Line Pricing
//!
//! The pure pricing function every cart line total is derived from.
//!
//! ```text
//! total = unit_price × quantity
//!       + Σ addon.price × addon.quantity × quantity
//!       + Σ config.price_modifier × quantity
//! ```
//!
//! Add-ons are consumable extras: every unit of the line needs
//! `addon.quantity` of them. Config modifiers are attribute deltas applied
//! once per unit of the line.

use crate::money::Money;
use crate::types::{AddonSelection, ConfigSelection};

/// Computes a line total.
///
/// ## Example
/// ```rust
/// use bazaar_core::pricing::line_total;
/// use bazaar_core::{AddonRef, AddonSelection, ConfigSelection, Money};
///
/// let addons = [AddonSelection::new(AddonRef::new("wrap", "Gift wrap", Money::from_cents(1000)), 1)];
/// let configs = [ConfigSelection::new("engraving", "Engraving", "Yes", Money::from_cents(500))];
///
/// let total = line_total(Money::from_cents(10_000), 2, &addons, &configs);
/// assert_eq!(total.cents(), 23_000); // 200 + 20 + 10
/// ```
pub fn line_total(
    unit_price: Money,
    quantity: i64,
    addons: &[AddonSelection],
    configs: &[ConfigSelection],
) -> Money {
    let base = unit_price.multiply_quantity(quantity);

    let addon_cost: Money = addons
        .iter()
        .map(|selection| {
            selection
                .addon
                .price
                .multiply_quantity(selection.quantity)
                .multiply_quantity(quantity)
        })
        .sum();

    let config_cost: Money = configs
        .iter()
        .map(|config| config.price_modifier.multiply_quantity(quantity))
        .sum();

    base + addon_cost + config_cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AddonRef;

    fn addon(cents: i64, quantity: i64) -> AddonSelection {
        AddonSelection::new(AddonRef::new("a", "Add-on", Money::from_cents(cents)), quantity)
    }

    fn config(cents: i64) -> ConfigSelection {
        ConfigSelection::new("c", "Config", "v", Money::from_cents(cents))
    }

    #[test]
    fn test_base_only() {
        assert_eq!(line_total(Money::from_cents(999), 3, &[], &[]).cents(), 2997);
    }

    #[test]
    fn test_addon_scales_with_both_quantities() {
        // 2 units of an add-on per line unit, 3 line units: 6 × 150
        let total = line_total(Money::zero(), 3, &[addon(150, 2)], &[]);
        assert_eq!(total.cents(), 900);
    }

    #[test]
    fn test_config_modifier_is_per_line_unit() {
        let total = line_total(Money::from_cents(1000), 4, &[addon(0, 5)], &[config(250)]);
        assert_eq!(total.cents(), 4000 + 1000);
    }

    #[test]
    fn test_negative_modifier_reduces_total() {
        let total = line_total(Money::from_cents(1000), 2, &[], &[config(-200)]);
        assert_eq!(total.cents(), 1600);
    }

    #[test]
    fn test_recomputation_is_idempotent() {
        let addons = [addon(300, 1)];
        let configs = [config(50)];
        let first = line_total(Money::from_cents(1200), 5, &addons, &configs);
        let second = line_total(Money::from_cents(1200), 5, &addons, &configs);
        assert_eq!(first, second);
    }
}
