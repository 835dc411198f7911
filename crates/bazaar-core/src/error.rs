//! # Error Types
//!
//! Domain-specific error types for bazaar-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bazaar-core errors (this file)                                        │
//! │  ├── ValidationError  - Collaborator input rejected before the engine  │
//! │  └── StorageError     - Storage adapter load/save failures             │
//! │                                                                         │
//! │  bazaar-store errors (separate crate)                                  │
//! │  └── StoreError       - SQLite failures, converted into StorageError   │
//! │                                                                         │
//! │  Shell errors (in app)                                                 │
//! │  └── ApiError         - What the host UI sees (serialized)             │
//! │                                                                         │
//! │  The engine itself never fails: storage errors are logged and the     │
//! │  in-memory cart stays authoritative.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by [`crate::validation`] when a collaborator builds a request the
/// cart should never see.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. a discount code with spaces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// The cart already holds as many lines as it may.
    #[error("Cart cannot have more than {max} lines")]
    CartFull { max: usize },
}

// =============================================================================
// Storage Error
// =============================================================================

/// Failures reported by a [`crate::CartStorage`] adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The stored payload could not be decoded (or encoded).
    ///
    /// On load the engine treats this as an empty cart.
    #[error("Stored cart is corrupt: {0}")]
    Corrupt(String),

    /// The backing store failed (disk, database, poisoned lock).
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// The adapter has been shut down and accepts no more writes.
    #[error("Storage is closed")]
    Closed,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for storage adapter results.
pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Unit Tests
// =============================================================================
