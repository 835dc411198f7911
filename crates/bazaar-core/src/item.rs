//! # Cart Lines
//!
//! [`CartEntry`] is what a catalog collaborator hands to `add_item`;
//! [`CartItem`] is the line the cart keeps.
//!
//! ## Snapshot Pattern
//! ```text
//! Product card                        Cart line
//! ────────────                        ─────────
//! ProductRef { price: $999 }  ──────► unit_price: $999   (frozen)
//!                                     total_price         (derived, private)
//!
//! A later catalog price change does not touch lines already in the cart.
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::identity::LineId;
use crate::money::Money;
use crate::pricing::line_total;
use crate::types::{AddonRef, AddonSelection, BundleRef, ConfigSelection, LineSubject, ProductRef, VariantRef};

// =============================================================================
// Cart Entry (add request)
// =============================================================================

/// A fully resolved add-to-cart request.
///
/// The engine trusts everything in here; collaborators resolve prices and
/// validate quantities before building one.
///
/// ```rust
/// use bazaar_core::{AddonRef, CartEntry, ConfigSelection, Money, ProductRef, VariantRef};
///
/// let entry = CartEntry::product(ProductRef::new("tee", "Tee", Money::from_cents(2000)))
///     .with_variant(VariantRef::new("tee-xl", "XL", Money::from_cents(2200)))
///     .with_addon(AddonRef::new("wrap", "Gift wrap", Money::from_cents(300)), 1)
///     .with_config(ConfigSelection::new("print", "Print", "Front", Money::from_cents(500)))
///     .with_quantity(2);
///
/// assert_eq!(entry.unit_price.cents(), 2200);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    pub subject: LineSubject,
    pub quantity: i64,
    #[serde(default)]
    pub selected_addons: Vec<AddonSelection>,
    #[serde(default)]
    pub selected_configs: Vec<ConfigSelection>,
    pub unit_price: Money,
}

impl CartEntry {
    /// Starts an entry for a product at its catalog price, quantity 1.
    pub fn product(product: ProductRef) -> Self {
        Self::for_subject(LineSubject::Product {
            product,
            variant: None,
        })
    }

    /// Starts an entry for a bundle at its catalog price, quantity 1.
    pub fn bundle(bundle: BundleRef) -> Self {
        Self::for_subject(LineSubject::Bundle { bundle })
    }

    fn for_subject(subject: LineSubject) -> Self {
        let unit_price = subject.catalog_price();
        CartEntry {
            subject,
            quantity: 1,
            selected_addons: Vec::new(),
            selected_configs: Vec::new(),
            unit_price,
        }
    }

    /// Refines a product entry with a variant and adopts the variant price.
    ///
    /// Has no effect on bundle entries.
    pub fn with_variant(mut self, variant: VariantRef) -> Self {
        if let LineSubject::Product { variant: slot, .. } = &mut self.subject {
            self.unit_price = variant.price;
            *slot = Some(variant);
        }
        self
    }

    pub fn with_addon(mut self, addon: AddonRef, quantity: i64) -> Self {
        self.selected_addons.push(AddonSelection::new(addon, quantity));
        self
    }

    pub fn with_config(mut self, config: ConfigSelection) -> Self {
        self.selected_configs.push(config);
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    /// Overrides the snapshotted unit price (sale price, member price, ...).
    pub fn with_unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// The identity key this entry resolves to.
    pub fn line_id(&self) -> LineId {
        LineId::derive(&self.subject, &self.selected_configs)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line in the cart.
///
/// ## Invariants
/// - `id` is always `LineId::derive(subject, selected_configs)`
/// - `quantity >= 1`
/// - `total_price` is always the pricing function over the current fields;
///   there is no setter for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    id: LineId,
    subject: LineSubject,
    quantity: i64,
    #[serde(default)]
    selected_addons: Vec<AddonSelection>,
    #[serde(default)]
    selected_configs: Vec<ConfigSelection>,
    unit_price: Money,
    #[serde(default)]
    total_price: Money,
    #[serde(default = "Utc::now")]
    #[ts(as = "String")]
    added_at: DateTime<Utc>,
}

impl CartItem {
    pub(crate) fn from_entry(entry: CartEntry) -> Self {
        let id = entry.line_id();
        let mut item = CartItem {
            id,
            subject: entry.subject,
            quantity: entry.quantity,
            selected_addons: entry.selected_addons,
            selected_configs: entry.selected_configs,
            unit_price: entry.unit_price,
            total_price: Money::zero(),
            added_at: Utc::now(),
        };
        item.recompute();
        item
    }

    pub fn id(&self) -> &LineId {
        &self.id
    }

    pub fn subject(&self) -> &LineSubject {
        &self.subject
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn selected_addons(&self) -> &[AddonSelection] {
        &self.selected_addons
    }

    pub fn selected_configs(&self) -> &[ConfigSelection] {
        &self.selected_configs
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn total_price(&self) -> Money {
        self.total_price
    }

    pub fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    pub fn display_name(&self) -> String {
        self.subject.display_name()
    }

    pub(crate) fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.recompute();
    }

    pub(crate) fn add_quantity(&mut self, quantity: i64) {
        self.set_quantity(self.quantity.saturating_add(quantity));
    }

    pub(crate) fn set_addons(&mut self, addons: Vec<AddonSelection>) {
        self.selected_addons = addons;
        self.recompute();
    }

    /// Re-derives id and total after deserialization; stored values are
    /// never trusted.
    pub(crate) fn normalize(&mut self) {
        self.id = LineId::derive(&self.subject, &self.selected_configs);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.total_price = line_total(
            self.unit_price,
            self.quantity,
            &self.selected_addons,
            &self.selected_configs,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headphones() -> CartEntry {
        CartEntry::product(ProductRef::new("hp", "Headphones", Money::from_cents(8_000)))
            .with_addon(AddonRef::new("case", "Case", Money::from_cents(1_500)), 1)
            .with_quantity(2)
    }

    #[test]
    fn test_from_entry_derives_total() {
        let item = CartItem::from_entry(headphones());
        assert_eq!(item.quantity(), 2);
        assert_eq!(item.total_price().cents(), 16_000 + 3_000);
        assert_eq!(item.id().as_str(), "hp-default-[]");
    }

    #[test]
    fn test_mutators_recompute_total() {
        let mut item = CartItem::from_entry(headphones());

        item.set_quantity(3);
        assert_eq!(item.total_price().cents(), 24_000 + 4_500);

        item.set_addons(Vec::new());
        assert_eq!(item.total_price().cents(), 24_000);
    }

    #[test]
    fn test_normalize_discards_stale_total() {
        let json = serde_json::json!({
            "id": "forged",
            "subject": { "kind": "product", "product": { "id": "hp", "name": "Headphones", "price": 8000 } },
            "quantity": 1,
            "unitPrice": 8000,
            "totalPrice": 1
        });
        let mut item: CartItem = serde_json::from_value(json).unwrap();
        item.normalize();

        assert_eq!(item.id().as_str(), "hp-default-[]");
        assert_eq!(item.total_price().cents(), 8_000);
    }

    #[test]
    fn test_variant_on_bundle_is_ignored() {
        let entry = CartEntry::bundle(BundleRef::new("b", "Bundle", Money::from_cents(5_000)))
            .with_variant(VariantRef::new("v", "V", Money::from_cents(1)));
        assert_eq!(entry.unit_price.cents(), 5_000);
        assert!(entry.subject.variant().is_none());
    }
}
