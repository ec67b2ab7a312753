//! Configuration
//!
//! `clap` argument groups for the operator CLI. Every value can come from a
//! flag or from the environment (`.env` included); library code only ever sees
//! the plain settings these groups convert into.

use thiserror::Error;

use crate::location::LocationError;

pub mod api;
pub mod checkout;
pub mod logging;

pub use api::ApiConfig;
pub use checkout::CheckoutConfig;
pub use logging::{LogFormat, LoggingConfig};

/// Configuration values that parsed but cannot be used.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Tax rate outside `0.0..=1.0`.
    #[error("tax rate must be between 0 and 1, got {0}")]
    InvalidTaxRate(f64),

    /// Payment description is blank.
    #[error("payment description must not be empty")]
    EmptyPaymentDescription,

    /// Only one of the default coordinates is set.
    #[error("default location needs both a latitude and a longitude")]
    IncompleteDefaultLocation,

    /// Default coordinates are out of range.
    #[error("invalid default location: {0}")]
    DefaultLocation(#[from] LocationError),
}
