//! # Catalog Snapshot Types
//!
//! Read-only views of catalog entities as the cart sees them.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Who Owns What                                     │
//! │                                                                         │
//! │  Catalog (external)                 Cart (this crate)                  │
//! │  ──────────────────                 ──────────────────                 │
//! │  products, variants,      snapshot  ProductRef / VariantRef /          │
//! │  bundles, add-ons,       ────────►  BundleRef / AddonRef               │
//! │  configuration options              ConfigSelection                    │
//! │                                                                         │
//! │  The cart never re-fetches a snapshot. Price changes in the catalog    │
//! │  do not reach lines already in the cart.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product / Variant / Bundle
// =============================================================================

/// A standalone product as presented by a product card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    /// Catalog identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// URL slug for linking back to the product page.
    #[serde(default)]
    pub slug: Option<String>,

    /// Base price at the time the card was rendered.
    pub price: Money,

    /// Primary image URL.
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        ProductRef {
            id: id.into(),
            name: name.into(),
            slug: None,
            price,
            image: None,
        }
    }
}

/// A purchasable variant refining a product (size, colour, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VariantRef {
    pub id: String,
    pub name: String,
    /// Variant price; replaces the product price as the line's unit price.
    pub price: Money,
}

impl VariantRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        VariantRef {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// A curated bundle sold as a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BundleRef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
}

impl BundleRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        BundleRef {
            id: id.into(),
            name: name.into(),
            slug: None,
            price,
            image: None,
        }
    }
}

// =============================================================================
// Line Subject
// =============================================================================

/// What a cart line sells: a product (optionally refined by a variant) or a
/// bundle. Never both, never neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LineSubject {
    Product {
        product: ProductRef,
        #[serde(default)]
        variant: Option<VariantRef>,
    },
    Bundle {
        bundle: BundleRef,
    },
}

impl LineSubject {
    /// The id that anchors the line identity: product id, else bundle id.
    pub fn owner_id(&self) -> &str {
        match self {
            LineSubject::Product { product, .. } => &product.id,
            LineSubject::Bundle { bundle } => &bundle.id,
        }
    }

    pub fn variant(&self) -> Option<&VariantRef> {
        match self {
            LineSubject::Product { variant, .. } => variant.as_ref(),
            LineSubject::Bundle { .. } => None,
        }
    }

    /// Catalog price for this subject: variant price when present.
    pub fn catalog_price(&self) -> Money {
        match self {
            LineSubject::Product {
                variant: Some(variant),
                ..
            } => variant.price,
            LineSubject::Product { product, .. } => product.price,
            LineSubject::Bundle { bundle } => bundle.price,
        }
    }

    /// Name shown in the cart drawer and handed to checkout.
    pub fn display_name(&self) -> String {
        match self {
            LineSubject::Product {
                product,
                variant: Some(variant),
            } => format!("{} - {}", product.name, variant.name),
            LineSubject::Product { product, .. } => product.name.clone(),
            LineSubject::Bundle { bundle } => bundle.name.clone(),
        }
    }
}

// =============================================================================
// Add-ons and Configuration
// =============================================================================

/// An optional extra that can be attached to a line (gift wrap, cable, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonRef {
    pub id: String,
    pub name: String,
    pub price: Money,
}

impl AddonRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        AddonRef {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

/// An add-on chosen for a line.
///
/// `quantity` is per unit of the line: a line of 3 with an add-on quantity
/// of 2 consumes 6 add-on units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AddonSelection {
    pub addon: AddonRef,
    pub quantity: i64,
}

impl AddonSelection {
    pub fn new(addon: AddonRef, quantity: i64) -> Self {
        AddonSelection { addon, quantity }
    }
}

/// A chosen configuration value and its flat price delta per line unit.
///
/// Configs are part of the line identity; add-ons are not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSelection {
    pub config_id: String,
    pub name: String,
    pub value: String,
    pub price_modifier: Money,
}

impl ConfigSelection {
    pub fn new(
        config_id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
        price_modifier: Money,
    ) -> Self {
        ConfigSelection {
            config_id: config_id.into(),
            name: name.into(),
            value: value.into(),
            price_modifier,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
