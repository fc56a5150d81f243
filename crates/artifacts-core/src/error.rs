//! Error types for artifacts-core.
//!
//! The store itself is total: lookups and mutations on unknown ids return
//! `None`/`false` rather than an error. The variants here cover the few
//! fallible paths around it, mostly validating configuration before a store is
//! built.

use thiserror::Error;

/// The main error type for artifacts-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Configuration value is invalid.
    ///
    /// Raised when building [`StoreOptions`](crate::StoreOptions) from raw
    /// values, e.g. a zero page cap or a zero TTL.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
