//! # Cart State Machine
//!
//! The pure cart value: lines, applied discount and the drawer flag.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Collaborator action      Operation            State change            │
//! │  ───────────────────      ─────────            ────────────            │
//! │  Add to cart ───────────► add_item() ────────► merge or push, open     │
//! │  Quantity stepper ──────► update_quantity() ─► replace qty (<1 = rm)   │
//! │  Add-on picker ─────────► update_addons() ───► replace add-ons         │
//! │  Remove button ─────────► remove_item() ─────► drop line               │
//! │  Discount form ─────────► apply_discount() ──► overwrite code/amount   │
//! │  Empty cart ────────────► clear() ───────────► no lines, no discount   │
//! │                                                                         │
//! │  Every operation is total: unknown ids are no-ops and return None.     │
//! │  Derived figures (subtotal, tax, total, count) are computed on read.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{StorageError, StorageResult};
use crate::identity::LineId;
use crate::item::{CartEntry, CartItem};
use crate::money::Money;
use crate::types::AddonSelection;
use crate::CART_TAX_RATE;

// =============================================================================
// Cart Events
// =============================================================================

/// What a successful mutation did. No-op mutations produce no event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CartEvent {
    ItemAdded { id: LineId },
    ItemMerged { id: LineId, quantity: i64 },
    ItemRemoved { id: LineId },
    QuantityUpdated { id: LineId, quantity: i64 },
    AddonsUpdated { id: LineId },
    Cleared,
    DiscountApplied { code: String, amount: Money },
    DiscountRemoved,
    Opened,
    Closed,
}

impl CartEvent {
    /// Whether the event changed state that is written to durable storage.
    ///
    /// The drawer flag is session-only.
    pub fn is_persistent(&self) -> bool {
        !matches!(self, CartEvent::Opened | CartEvent::Closed)
    }
}

// =============================================================================
// Totals
// =============================================================================

/// Derived figures for the cart drawer and checkout hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    /// Sum of quantities across lines.
    pub item_count: i64,
    /// Number of distinct lines.
    pub line_count: usize,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            line_count: cart.line_count(),
            subtotal: cart.subtotal(),
            tax: cart.tax(),
            discount: cart.discount_amount(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - At most one line per [`LineId`]; insertion order is display order
/// - Every line has `quantity >= 1`
/// - `discount_amount` is zero whenever `discount_code` is `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
    is_open: bool,
    discount_code: Option<String>,
    discount_amount: Money,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Mutators
    // -------------------------------------------------------------------------

    /// Adds an entry, merging onto an existing line with the same identity.
    ///
    /// ## Merge Policy
    /// A merge adds the entry's quantity and recomputes the total. The
    /// existing line keeps its own add-ons and unit price; the entry's
    /// add-on selection is discarded.
    ///
    /// Always opens the drawer. An entry with `quantity < 1` adds nothing.
    pub fn add_item(&mut self, entry: CartEntry) -> Option<CartEvent> {
        let was_open = std::mem::replace(&mut self.is_open, true);

        if entry.quantity < 1 {
            warn!(quantity = entry.quantity, "Ignoring cart entry with non-positive quantity");
            return (!was_open).then_some(CartEvent::Opened);
        }

        let id = entry.line_id();
        if let Some(item) = self.item_mut(&id) {
            item.add_quantity(entry.quantity);
            debug!(line = %id, quantity = item.quantity(), "Merged entry onto existing line");
            return Some(CartEvent::ItemMerged {
                quantity: item.quantity(),
                id,
            });
        }

        debug!(line = %id, quantity = entry.quantity, "Added new line");
        self.items.push(CartItem::from_entry(entry));
        Some(CartEvent::ItemAdded { id })
    }

    /// Removes a line. Unknown ids are a no-op.
    pub fn remove_item(&mut self, id: &LineId) -> Option<CartEvent> {
        let position = self.items.iter().position(|item| item.id() == id);
        match position {
            Some(index) => {
                self.items.remove(index);
                Some(CartEvent::ItemRemoved { id: id.clone() })
            }
            None => {
                debug!(line = %id, "remove_item: line not in cart");
                None
            }
        }
    }

    /// Replaces a line's quantity; anything below 1 removes the line.
    pub fn update_quantity(&mut self, id: &LineId, quantity: i64) -> Option<CartEvent> {
        if quantity < 1 {
            return self.remove_item(id);
        }

        match self.item_mut(id) {
            Some(item) => {
                item.set_quantity(quantity);
                Some(CartEvent::QuantityUpdated {
                    id: id.clone(),
                    quantity,
                })
            }
            None => {
                debug!(line = %id, "update_quantity: line not in cart");
                None
            }
        }
    }

    /// Replaces a line's add-on selection.
    pub fn update_addons(&mut self, id: &LineId, addons: Vec<AddonSelection>) -> Option<CartEvent> {
        match self.item_mut(id) {
            Some(item) => {
                item.set_addons(addons);
                Some(CartEvent::AddonsUpdated { id: id.clone() })
            }
            None => {
                debug!(line = %id, "update_addons: line not in cart");
                None
            }
        }
    }

    /// Empties the cart and drops any discount in one step.
    pub fn clear(&mut self) -> Option<CartEvent> {
        self.items.clear();
        self.discount_code = None;
        self.discount_amount = Money::zero();
        Some(CartEvent::Cleared)
    }

    /// Overwrites the applied discount.
    ///
    /// The code is not checked here; the discount collaborator validates it
    /// first. Negative amounts are floored at zero.
    pub fn apply_discount(&mut self, code: impl Into<String>, amount: Money) -> Option<CartEvent> {
        let code = code.into();
        let amount = amount.clamp_non_negative();
        self.discount_code = Some(code.clone());
        self.discount_amount = amount;
        Some(CartEvent::DiscountApplied { code, amount })
    }

    pub fn remove_discount(&mut self) -> Option<CartEvent> {
        if self.discount_code.is_none() && self.discount_amount.is_zero() {
            return None;
        }
        self.discount_code = None;
        self.discount_amount = Money::zero();
        Some(CartEvent::DiscountRemoved)
    }

    pub fn open(&mut self) -> Option<CartEvent> {
        self.set_open(true)
    }

    pub fn close(&mut self) -> Option<CartEvent> {
        self.set_open(false)
    }

    pub fn toggle(&mut self) -> Option<CartEvent> {
        self.set_open(!self.is_open)
    }

    fn set_open(&mut self, open: bool) -> Option<CartEvent> {
        if self.is_open == open {
            return None;
        }
        self.is_open = open;
        Some(if open { CartEvent::Opened } else { CartEvent::Closed })
    }

    fn item_mut(&mut self, id: &LineId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, id: &LineId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref()
    }

    pub fn discount_amount(&self) -> Money {
        self.discount_amount
    }

    /// Sum of line totals, recomputed on every read.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(CartItem::total_price).sum()
    }

    /// Flat 10% of the subtotal.
    pub fn tax(&self) -> Money {
        self.subtotal().calculate_tax(CART_TAX_RATE)
    }

    /// `max(0, subtotal + tax - discount)`.
    pub fn total(&self) -> Money {
        (self.subtotal() + self.tax() - self.discount_amount).clamp_non_negative()
    }

    /// Sum of quantities, not the number of lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(CartItem::quantity).sum()
    }

    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::from(self)
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    /// The durable subset of the cart. The drawer flag is left out.
    pub fn snapshot(&self) -> PersistedCart {
        PersistedCart {
            items: self.items.clone(),
            discount_code: self.discount_code.clone(),
            discount_amount: self.discount_amount,
        }
    }

    /// Rebuilds a cart from a stored payload.
    ///
    /// Ids and totals are re-derived, duplicate identities merged, lines
    /// below quantity 1 dropped and the drawer starts closed.
    pub fn rehydrate(persisted: PersistedCart) -> Self {
        let mut cart = Cart::new();

        for mut item in persisted.items {
            if item.quantity() < 1 {
                warn!(line = %item.id(), "Dropping stored line with non-positive quantity");
                continue;
            }
            item.normalize();

            match cart.item_mut(item.id()) {
                Some(existing) => existing.add_quantity(item.quantity()),
                None => cart.items.push(item),
            }
        }

        if let Some(code) = persisted.discount_code {
            cart.discount_code = Some(code);
            cart.discount_amount = persisted.discount_amount.clamp_non_negative();
        }

        cart
    }
}

// =============================================================================
// Persisted Payload
// =============================================================================

/// What the cart writes to its durable slot.
///
/// ```json
/// { "items": [...], "discountCode": "WELCOME10", "discountAmount": 1000 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PersistedCart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub discount_code: Option<String>,
    #[serde(default)]
    pub discount_amount: Money,
}

impl PersistedCart {
    pub fn to_json(&self) -> StorageResult<String> {
        serde_json::to_string(self).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    pub fn from_json(payload: &str) -> StorageResult<Self> {
        serde_json::from_str(payload).map_err(|e| StorageError::Corrupt(e.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddonRef, ConfigSelection, ProductRef};

    fn lamp() -> ProductRef {
        ProductRef::new("lamp", "Desk Lamp", Money::from_cents(4_000))
    }

    #[test]
    fn test_add_opens_drawer() {
        let mut cart = Cart::new();
        assert!(!cart.is_open());

        let event = cart.add_item(CartEntry::product(lamp()));
        assert!(matches!(event, Some(CartEvent::ItemAdded { .. })));
        assert!(cart.is_open());
    }

    #[test]
    fn test_add_non_positive_quantity_is_ignored() {
        let mut cart = Cart::new();
        let event = cart.add_item(CartEntry::product(lamp()).with_quantity(0));

        assert_eq!(event, Some(CartEvent::Opened));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_merge_reports_new_quantity() {
        let mut cart = Cart::new();
        cart.add_item(CartEntry::product(lamp()).with_quantity(2));
        let event = cart.add_item(CartEntry::product(lamp()).with_quantity(3));

        let id = CartEntry::product(lamp()).line_id();
        assert_eq!(event, Some(CartEvent::ItemMerged { id, quantity: 5 }));
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut cart = Cart::new();
        cart.add_item(CartEntry::product(lamp()));
        let before = cart.clone();
        let ghost = LineId::from("ghost-default-[]");

        assert!(cart.remove_item(&ghost).is_none());
        assert!(cart.update_quantity(&ghost, 3).is_none());
        assert!(cart.update_addons(&ghost, Vec::new()).is_none());
        assert_eq!(cart, before);
    }

    #[test]
    fn test_update_addons_recomputes_line() {
        let mut cart = Cart::new();
        cart.add_item(CartEntry::product(lamp()).with_quantity(2));
        let id = CartEntry::product(lamp()).line_id();

        let bulb = AddonRef::new("bulb", "Spare bulb", Money::from_cents(500));
        cart.update_addons(&id, vec![AddonSelection::new(bulb, 2)]);

        assert_eq!(cart.subtotal().cents(), 8_000 + 2_000);
    }

    #[test]
    fn test_remove_discount_without_discount_is_noop() {
        let mut cart = Cart::new();
        assert!(cart.remove_discount().is_none());

        cart.apply_discount("SPRING", Money::from_cents(500));
        assert_eq!(cart.remove_discount(), Some(CartEvent::DiscountRemoved));
        assert_eq!(cart.discount_code(), None);
        assert!(cart.discount_amount().is_zero());
    }

    #[test]
    fn test_negative_discount_is_floored() {
        let mut cart = Cart::new();
        cart.apply_discount("ODD", Money::from_cents(-300));
        assert!(cart.discount_amount().is_zero());
        assert_eq!(cart.discount_code(), Some("ODD"));
    }

    #[test]
    fn test_drawer_toggle() {
        let mut cart = Cart::new();
        assert_eq!(cart.toggle(), Some(CartEvent::Opened));
        assert_eq!(cart.open(), None);
        assert_eq!(cart.close(), Some(CartEvent::Closed));
        assert!(!CartEvent::Closed.is_persistent());
        assert!(CartEvent::Cleared.is_persistent());
    }

    #[test]
    fn test_snapshot_omits_drawer_flag() {
        let mut cart = Cart::new();
        cart.add_item(
            CartEntry::product(lamp())
                .with_config(ConfigSelection::new("shade", "Shade", "Linen", Money::from_cents(700))),
        );
        cart.apply_discount("LAMP5", Money::from_cents(500));

        let json = cart.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value.get("isOpen").is_none());
        assert_eq!(value["discountCode"], "LAMP5");
        assert_eq!(value["discountAmount"], 500);
        assert_eq!(value["items"][0]["totalPrice"], 4_700);
    }

    #[test]
    fn test_rehydrate_resets_drawer_and_rederives() {
        let mut cart = Cart::new();
        cart.add_item(CartEntry::product(lamp()).with_quantity(3));
        assert!(cart.is_open());

        let restored = Cart::rehydrate(cart.snapshot());
        assert!(!restored.is_open());
        assert_eq!(restored.subtotal().cents(), 12_000);
        assert_eq!(restored.items(), cart.items());
    }

    #[test]
    fn test_rehydrate_merges_duplicates_and_drops_empty_lines() {
        let mut first = Cart::new();
        first.add_item(CartEntry::product(lamp()).with_quantity(1));
        let line = first.items()[0].clone();

        let payload = PersistedCart {
            items: vec![line.clone(), line],
            discount_code: None,
            discount_amount: Money::from_cents(900),
        };
        let restored = Cart::rehydrate(payload);

        assert_eq!(restored.line_count(), 1);
        assert_eq!(restored.item_count(), 2);
        // no code means no discount
        assert!(restored.discount_amount().is_zero());
    }

    #[test]
    fn test_corrupt_payload_is_reported() {
        let err = PersistedCart::from_json("{ not json").unwrap_err();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
