//! Payments
//!
//! Payment methods differ in how they complete: cash is confirmed on the
//! spot, card and wallet payments need an asynchronous round-trip through
//! the external payment provider.

use std::fmt;

use percent_encoding::percent_decode_str;
use thiserror::Error;

pub mod gateway;
pub mod request;

pub use gateway::{MockPaymentGateway, PaymentGateway};
pub use request::{PaymentRequest, PaymentRequestError, ProviderResult, ProviderStatus};

const DEFAULT_FAILURE_REASON: &str = "payment failed";

/// Failure reason reported when the provider does not answer in time.
pub const TIMEOUT_REASON: &str = "payment timed out";

/// How a payment method reaches a [`PaymentOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionMode {
    /// Paid as soon as the user confirms.
    Immediate,

    /// Paid once the payment provider authorizes the charge.
    AsyncAuthorization,
}

/// Payment methods offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    /// Cash on service.
    Cash,

    /// Credit or debit card through the payment provider.
    Card,

    /// Device wallet (Apple Pay) through the payment provider.
    WalletPay,
}

impl PaymentMethod {
    /// Every method, in display order.
    pub const ALL: [Self; 3] = [Self::Cash, Self::Card, Self::WalletPay];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Card => "Credit card",
            Self::WalletPay => "Apple Pay",
        }
    }

    /// Code sent as `paymentType` when creating an order.
    ///
    /// The backend distinguishes cash (`1`) from online (`2`) payments only.
    pub fn api_code(self) -> u8 {
        match self {
            Self::Cash => 1,
            Self::Card | Self::WalletPay => 2,
        }
    }

    /// How this method completes.
    pub fn completion_mode(self) -> CompletionMode {
        match self {
            Self::Cash => CompletionMode::Immediate,
            Self::Card | Self::WalletPay => CompletionMode::AsyncAuthorization,
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The payment succeeded. Online payments carry the provider's reference.
    Paid {
        /// Provider payment reference.
        payment_id: Option<String>,
    },

    /// The payment failed with a user-facing reason.
    Failed(String),

    /// The user dismissed the payment step.
    Canceled,
}

impl PaymentOutcome {
    /// A failure with its reason decoded from transport encoding.
    pub fn failed(raw_reason: Option<&str>) -> Self {
        Self::Failed(decode_reason(raw_reason))
    }
}

/// A payment attempt failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The provider declined, errored or timed out; the reason is shown verbatim.
    #[error("{0}")]
    Failed(String),
}

/// Decode a provider failure message for display.
///
/// Provider messages may arrive percent-encoded; blank or missing messages
/// fall back to a generic reason.
pub fn decode_reason(raw: Option<&str>) -> String {
    let decoded = raw
        .map(|raw| percent_decode_str(raw).decode_utf8_lossy().trim().to_string())
        .unwrap_or_default();

    if decoded.is_empty() {
        DEFAULT_FAILURE_REASON.to_string()
    } else {
        decoded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_completes_immediately() {
        assert_eq!(
            PaymentMethod::Cash.completion_mode(),
            CompletionMode::Immediate
        );
        assert_eq!(PaymentMethod::Cash.api_code(), 1);
    }

    #[test]
    fn online_methods_need_authorization() {
        for method in [PaymentMethod::Card, PaymentMethod::WalletPay] {
            assert_eq!(
                method.completion_mode(),
                CompletionMode::AsyncAuthorization,
                "{method}"
            );
            assert_eq!(method.api_code(), 2, "{method}");
        }
    }

    #[test]
    fn labels_are_distinct() {
        let labels: Vec<_> = PaymentMethod::ALL.iter().map(|m| m.label()).collect();

        assert_eq!(labels, ["Cash", "Credit card", "Apple Pay"]);
    }

    #[test]
    fn decode_reason_removes_percent_encoding() {
        assert_eq!(
            decode_reason(Some("3D%20secure%20declined")),
            "3D secure declined"
        );
    }

    #[test]
    fn decode_reason_keeps_plain_text() {
        assert_eq!(
            decode_reason(Some("3D secure declined")),
            "3D secure declined"
        );
    }

    #[test]
    fn decode_reason_decodes_utf8_sequences() {
        assert_eq!(
            decode_reason(Some("%D9%81%D8%B4%D9%84%20%D8%A7%D9%84%D8%AF%D9%81%D8%B9")),
            "فشل الدفع"
        );
    }

    #[test]
    fn decode_reason_falls_back_for_missing_message() {
        assert_eq!(decode_reason(None), "payment failed");
        assert_eq!(decode_reason(Some("  ")), "payment failed");
    }

    #[test]
    fn failed_outcome_is_decoded() {
        assert_eq!(
            PaymentOutcome::failed(Some("card%20expired")),
            PaymentOutcome::Failed("card expired".to_string())
        );
    }
}
