//! # Line Identity
//!
//! Decides whether two add-to-cart requests land on the same line.
//!
//! ## Key Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   "{owner}-{variant}-{configs}"                                         │
//! │                                                                         │
//! │   owner    product id, or bundle id when the line is a bundle           │
//! │   variant  variant id, or "default"                                     │
//! │   configs  compact JSON of the selected configs, sorted by config id   │
//! │                                                                         │
//! │   laptop-14-silver-[{"configId":"ram","name":"RAM",...}]                │
//! │                                                                         │
//! │   Add-ons are NOT part of the key: the same product/variant/configs    │
//! │   with a different add-on selection merges onto the existing line.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Known Collisions
//! The key is plain text with no kind prefix and no escaping, so distinct
//! subjects can resolve to the same line and merge:
//! - a variant whose id is literally `default` keys the same as the product
//!   with no variant (`mug-default-[]`)
//! - a bundle and a product sharing an id key the same (`gift-default-[]`)
//! - ids containing `-` can shift the owner/variant boundary
//!   (`a-b` + `c` and `a` + `b-c` both give `a-b-c-[]`)
//!
//! Catalog ids are expected to be unique across products and bundles and
//! variant ids never to be `default`. The cart does not reconcile these.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::{ConfigSelection, LineSubject};
use crate::DEFAULT_VARIANT_MARKER;

/// Identity key of a cart line.
///
/// Always derived from the line's subject and configs, never assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineId(String);

impl LineId {
    /// Derives the identity key for a subject and its config selection.
    ///
    /// ```rust
    /// use bazaar_core::{LineId, LineSubject, Money, ProductRef};
    ///
    /// let subject = LineSubject::Product {
    ///     product: ProductRef::new("mug", "Mug", Money::from_cents(1000)),
    ///     variant: None,
    /// };
    /// let id = LineId::derive(&subject, &[]);
    /// assert_eq!(id.as_str(), "mug-default-[]");
    /// ```
    pub fn derive(subject: &LineSubject, configs: &[ConfigSelection]) -> Self {
        let variant = subject
            .variant()
            .map_or(DEFAULT_VARIANT_MARKER, |variant| variant.id.as_str());

        LineId(format!(
            "{}-{}-{}",
            subject.owner_id(),
            variant,
            canonical_configs(configs)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for LineId {
    fn from(value: String) -> Self {
        LineId(value)
    }
}

impl From<&str> for LineId {
    fn from(value: &str) -> Self {
        LineId(value.to_string())
    }
}

/// Serializes configs in a stable order so selection order never splits a line.
fn canonical_configs(configs: &[ConfigSelection]) -> String {
    let mut sorted: Vec<&ConfigSelection> = configs.iter().collect();
    sorted.sort_by(|a, b| a.config_id.cmp(&b.config_id));
    serde_json::to_string(&sorted).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{BundleRef, ProductRef, VariantRef};

    fn storage(value: &str, cents: i64) -> ConfigSelection {
        ConfigSelection::new("storage", "Storage", value, Money::from_cents(cents))
    }

    fn ram(value: &str) -> ConfigSelection {
        ConfigSelection::new("ram", "RAM", value, Money::zero())
    }

    fn phone(variant: Option<VariantRef>) -> LineSubject {
        LineSubject::Product {
            product: ProductRef::new("phone", "Phone", Money::from_cents(50_000)),
            variant,
        }
    }

    #[test]
    fn test_variant_marker() {
        let plain = LineId::derive(&phone(None), &[]);
        assert!(plain.as_str().starts_with("phone-default-"));

        let blue = phone(Some(VariantRef::new("blue", "Blue", Money::from_cents(51_000))));
        assert!(LineId::derive(&blue, &[]).as_str().starts_with("phone-blue-"));
    }

    #[test]
    fn test_configs_split_identity() {
        let small = LineId::derive(&phone(None), &[storage("128GB", 0)]);
        let large = LineId::derive(&phone(None), &[storage("256GB", 10_000)]);
        assert_ne!(small, large);
    }

    #[test]
    fn test_config_order_is_canonical() {
        let a = LineId::derive(&phone(None), &[storage("256GB", 10_000), ram("8GB")]);
        let b = LineId::derive(&phone(None), &[ram("8GB"), storage("256GB", 10_000)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_bundle_identity() {
        let bundle = LineSubject::Bundle {
            bundle: BundleRef::new("desk-setup", "Desk Setup", Money::from_cents(30_000)),
        };
        assert_eq!(LineId::derive(&bundle, &[]).as_str(), "desk-setup-default-[]");
    }

    #[test]
    fn test_default_variant_id_collides_with_no_variant() {
        let plain = LineId::derive(&phone(None), &[]);
        let literal = phone(Some(VariantRef::new(
            "default",
            "Default",
            Money::from_cents(50_000),
        )));

        assert_eq!(LineId::derive(&literal, &[]), plain);
    }

    #[test]
    fn test_bundle_and_product_sharing_an_id_collide() {
        let bundle = LineSubject::Bundle {
            bundle: BundleRef::new("phone", "Phone Kit", Money::from_cents(60_000)),
        };

        assert_eq!(LineId::derive(&bundle, &[]), LineId::derive(&phone(None), &[]));
    }

    #[test]
    fn test_hyphenated_ids_can_collide() {
        let left = LineSubject::Product {
            product: ProductRef::new("a-b", "A-B", Money::zero()),
            variant: Some(VariantRef::new("c", "C", Money::zero())),
        };
        let right = LineSubject::Product {
            product: ProductRef::new("a", "A", Money::zero()),
            variant: Some(VariantRef::new("b-c", "B-C", Money::zero())),
        };

        assert_eq!(LineId::derive(&left, &[]), LineId::derive(&right, &[]));
    }
}
