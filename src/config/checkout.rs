//! Checkout Config

use std::time::Duration;

use clap::Args;
use decimal_percentage::Percentage;

use crate::{
    checkout::CheckoutSettings,
    config::ConfigError,
    location::{Coordinate, LocationPolicy},
    totals::STANDARD_TAX_RATE,
};

/// Checkout policy settings.
#[derive(Debug, Clone, Args)]
pub struct CheckoutConfig {
    /// Tax rate applied to estimated totals, as a fraction
    #[arg(long, env = "JAZ_TAX_RATE", default_value_t = STANDARD_TAX_RATE)]
    pub tax_rate: f64,

    /// Accept orders placed at the configured default location
    #[arg(long, env = "JAZ_ALLOW_DEFAULT_LOCATION", default_value_t = false)]
    pub allow_default_location: bool,

    /// Latitude of the default location
    #[arg(long, env = "JAZ_DEFAULT_LAT", requires = "default_lng")]
    pub default_lat: Option<f64>,

    /// Longitude of the default location
    #[arg(long, env = "JAZ_DEFAULT_LNG", requires = "default_lat")]
    pub default_lng: Option<f64>,

    /// Description attached to online payment requests
    #[arg(long, env = "JAZ_PAYMENT_DESCRIPTION", default_value = "Home service order")]
    pub payment_description: String,

    /// Seconds to wait for the payment provider
    #[arg(long, env = "JAZ_PAYMENT_TIMEOUT_SECS", default_value_t = 300_u64)]
    pub payment_timeout_secs: u64,
}

impl CheckoutConfig {
    /// Session settings for this configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the tax rate or description is unusable.
    pub fn settings(&self) -> Result<CheckoutSettings, ConfigError> {
        if !(0.0..=1.0).contains(&self.tax_rate) {
            return Err(ConfigError::InvalidTaxRate(self.tax_rate));
        }

        if self.payment_description.trim().is_empty() {
            return Err(ConfigError::EmptyPaymentDescription);
        }

        Ok(CheckoutSettings {
            tax_rate: Percentage::from(self.tax_rate),
            location_policy: LocationPolicy {
                allow_default_location: self.allow_default_location,
            },
            payment_description: self.payment_description.trim().to_string(),
            payment_timeout: Duration::from_secs(self.payment_timeout_secs),
        })
    }

    /// The configured default location, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IncompleteDefaultLocation`] when only one coordinate
    /// is set and [`ConfigError::DefaultLocation`] when they are out of range.
    pub fn default_location(&self) -> Result<Option<Coordinate>, ConfigError> {
        match (self.default_lat, self.default_lng) {
            (Some(lat), Some(lng)) => Ok(Some(Coordinate::new(lat, lng)?)),
            (None, None) => Ok(None),
            _ => Err(ConfigError::IncompleteDefaultLocation),
        }
    }
}
