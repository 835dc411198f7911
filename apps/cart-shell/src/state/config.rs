//! # Shell Configuration
//!
//! Loaded once at startup and read-only afterwards.
//!
//! ## Sources (later wins)
//! 1. Defaults (this file)
//! 2. Config file: `$BAZAAR_CONFIG`, else `<config dir>/cart.toml`
//! 3. Environment variables (`BAZAAR_*`)
//!
//! ```toml
//! [storage]
//! database_path = "/var/lib/bazaar/cart.db"
//! cart_slot = "cart-storage"
//!
//! [session]
//! id = "kiosk-3"
//!
//! [display]
//! currency_code = "EUR"
//! currency_symbol = "€"
//! ```

use std::path::PathBuf;

use bazaar_core::{Money, DEFAULT_CART_SLOT};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

/// File name of the SQLite database inside the data directory.
pub const DEFAULT_DATABASE_FILE: &str = "bazaar-cart.db";

/// Shell configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub storage: StorageSection,
    pub session: SessionSection,
    pub display: DisplaySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Database file. `None` uses the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Keep the cart in an in-memory database (nothing survives exit).
    pub in_memory: bool,

    /// Name of the slot the cart is stored under.
    pub cart_slot: String,
}

impl Default for StorageSection {
    fn default() -> Self {
        StorageSection {
            database_path: None,
            in_memory: false,
            cart_slot: DEFAULT_CART_SLOT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Writer identity recorded on the cart slot. Generated when unset.
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Currency code (ISO 4217), passed through to checkout.
    pub currency_code: String,

    /// Currency symbol for formatted amounts.
    pub currency_symbol: String,

    /// Number of decimal places for currency.
    pub currency_decimals: u8,
}

impl Default for DisplaySection {
    fn default() -> Self {
        DisplaySection {
            currency_code: "USD".to_string(),
            currency_symbol: "$".to_string(),
            currency_decimals: 2,
        }
    }
}

impl ShellConfig {
    // =========================================================================
    // Loading
    // =========================================================================

    /// Loads defaults, then the config file (if present), then env overrides.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `BAZAAR_*` overrides from any key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("BAZAAR_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(flag) = lookup("BAZAAR_IN_MEMORY") {
            self.storage.in_memory = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        if let Some(slot) = lookup("BAZAAR_CART_SLOT") {
            self.storage.cart_slot = slot;
        }

        if let Some(id) = lookup("BAZAAR_SESSION_ID") {
            self.session.id = Some(id);
        }

        if let Some(symbol) = lookup("BAZAAR_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.cart_slot.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.cart_slot must not be empty".into()));
        }

        if matches!(&self.session.id, Some(id) if id.trim().is_empty()) {
            return Err(ConfigError::Invalid("session.id must not be empty when set".into()));
        }

        if self.display.currency_decimals > 4 {
            return Err(ConfigError::Invalid(format!(
                "display.currency_decimals must be at most 4, got {}",
                self.display.currency_decimals
            )));
        }

        Ok(())
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "bazaar", "cart")
    }

    /// `$BAZAAR_CONFIG`, else `cart.toml` in the platform config directory.
    pub fn default_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("BAZAAR_CONFIG") {
            return Some(PathBuf::from(path));
        }
        Self::project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    /// Resolves the database file, creating its directory if needed.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        let path = match &self.storage.database_path {
            Some(path) => path.clone(),
            None => Self::project_dirs()
                .ok_or(ConfigError::NoDataDir)?
                .data_dir()
                .join(DEFAULT_DATABASE_FILE),
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Read {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Ok(path)
    }

    // =========================================================================
    // Formatting
    // =========================================================================

    /// Formats an amount as a currency string.
    ///
    /// ```rust
    /// use bazaar_cart_shell::state::ShellConfig;
    /// use bazaar_core::Money;
    ///
    /// let config = ShellConfig::default();
    /// assert_eq!(config.format_currency(Money::from_cents(1234)), "$12.34");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        let cents = amount.cents();
        let decimals = u32::from(self.display.currency_decimals);
        let divisor = 10_i64.pow(decimals);
        let whole = (cents / divisor).abs();
        let frac = (cents % divisor).abs();
        let sign = if cents < 0 { "-" } else { "" };

        if decimals > 0 {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                self.display.currency_symbol,
                whole,
                frac,
                width = decimals as usize
            )
        } else {
            format!("{}{}{}", sign, self.display.currency_symbol, whole)
        }
    }
}
