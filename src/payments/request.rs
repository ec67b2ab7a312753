//! Payment provider boundary types.

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::payments::PaymentOutcome;

/// A payment request could not be built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentRequestError {
    /// Online payments need a positive amount (amount in minor units).
    #[error("payment amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// The provider requires a description.
    #[error("payment description must not be empty")]
    EmptyDescription,
}

/// Charge handed to the payment provider.
///
/// Only constructible through [`PaymentRequest::new`], so an invalid request
/// never reaches the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    amount: i64,
    currency: &'static str,
    description: String,
}

impl PaymentRequest {
    /// Build a payment request for `amount`.
    ///
    /// # Errors
    ///
    /// - [`PaymentRequestError::NonPositiveAmount`]: the amount is zero or negative.
    /// - [`PaymentRequestError::EmptyDescription`]: the description is blank.
    pub fn new(
        amount: &Money<'static, Currency>,
        description: &str,
    ) -> Result<Self, PaymentRequestError> {
        let minor = amount.to_minor_units();

        if minor <= 0 {
            return Err(PaymentRequestError::NonPositiveAmount(minor));
        }

        let description = description.trim();

        if description.is_empty() {
            return Err(PaymentRequestError::EmptyDescription);
        }

        Ok(Self {
            amount: minor,
            currency: amount.currency().iso_alpha_code,
            description: description.to_string(),
        })
    }

    /// Amount in minor units.
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// ISO currency code.
    pub fn currency(&self) -> &'static str {
        self.currency
    }

    /// Charge description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Final status reported by the payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderStatus {
    /// Charge captured.
    Paid,

    /// Charge declined or errored.
    Failed,

    /// Collection dismissed by the user.
    #[serde(alias = "cancelled")]
    Canceled,
}

/// Result reported by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderResult {
    /// Final status.
    pub status: ProviderStatus,

    /// Provider payment reference.
    #[serde(default)]
    pub id: Option<String>,

    /// Failure message, possibly percent-encoded.
    #[serde(default)]
    pub message: Option<String>,
}

impl From<ProviderResult> for PaymentOutcome {
    fn from(result: ProviderResult) -> Self {
        match result.status {
            ProviderStatus::Paid => Self::Paid {
                payment_id: result.id,
            },
            ProviderStatus::Failed => Self::failed(result.message.as_deref()),
            ProviderStatus::Canceled => Self::Canceled,
        }
    }
}
