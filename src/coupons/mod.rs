//! Coupons
//!
//! A coupon check asks the pricing service for server-authoritative totals.
//! Once accepted, a [`CouponResult`] replaces local estimation until the code
//! is cleared or the service line changes.

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    api::ApiError,
    money::{AmountError, marketplace_currency, money_from_major},
    services::CouponLine,
};

pub mod ledger;
pub mod service;

pub use ledger::{AppliedCoupon, CouponLedger, CouponResolution, CouponTicket};
pub use service::{MockPricingService, PricingService};

/// Errors from a coupon check.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CouponError {
    /// The pricing service rejected the code.
    #[error("{}", .0.as_deref().unwrap_or("invalid coupon code"))]
    Rejected(Option<String>),

    /// The pricing service answered with amounts that cannot be used.
    #[error("invalid coupon response: {0}")]
    InvalidResponse(String),

    /// The coupon check could not be completed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<AmountError> for CouponError {
    fn from(error: AmountError) -> Self {
        Self::InvalidResponse(error.to_string())
    }
}

/// Server-confirmed totals for a coupon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouponResult {
    /// Amount before tax.
    pub total_before_tax: Money<'static, Currency>,

    /// Discount granted by the coupon.
    pub discount: Money<'static, Currency>,

    /// Tax amount.
    pub total_tax: Money<'static, Currency>,

    /// Amount the customer pays.
    pub final_total: Money<'static, Currency>,
}

impl TryFrom<&CouponTotals> for CouponResult {
    type Error = CouponError;

    fn try_from(totals: &CouponTotals) -> Result<Self, Self::Error> {
        let currency = marketplace_currency();

        let result = Self {
            total_before_tax: money_from_major(totals.total_before_tax, currency)?,
            discount: money_from_major(totals.discount, currency)?,
            total_tax: money_from_major(totals.total_tax, currency)?,
            final_total: money_from_major(totals.final_total, currency)?,
        };

        let amounts = [
            result.total_before_tax,
            result.discount,
            result.total_tax,
            result.final_total,
        ];

        if amounts.iter().any(|amount| amount.to_minor_units() < 0) {
            return Err(CouponError::InvalidResponse(
                "negative amount in coupon totals".to_string(),
            ));
        }

        Ok(result)
    }
}

/// Coupon check request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CouponCheckRequest {
    /// Coupon code. The deployed backend expects the misspelled `coupun` key.
    #[serde(rename = "coupun")]
    pub code: String,

    /// Service lines to price.
    pub extra: Vec<CouponLine>,
}

/// Coupon check response body.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CouponCheckResponse {
    /// `false` when the code was rejected.
    #[serde(default)]
    pub status: Option<bool>,

    /// Server message.
    #[serde(default)]
    pub message: Option<String>,

    /// Confirmed totals, present only for an accepted code.
    #[serde(default)]
    pub items: Option<CouponTotals>,
}

/// Confirmed totals in major units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CouponTotals {
    /// Amount before tax.
    pub total_before_tax: f64,

    /// Discount granted by the coupon.
    pub discount: f64,

    /// Tax amount.
    pub total_tax: f64,

    /// Amount the customer pays.
    pub final_total: f64,
}

/// Map a coupon check response into a confirmed result.
///
/// # Errors
///
/// - [`CouponError::Rejected`]: `status` was `false` or no totals were returned.
/// - [`CouponError::InvalidResponse`]: totals were not finite or negative.
pub fn interpret_coupon_response(
    response: &CouponCheckResponse,
) -> Result<CouponResult, CouponError> {
    match (response.status, &response.items) {
        (Some(false), _) | (_, None) => Err(CouponError::Rejected(response.message.clone())),
        (_, Some(totals)) => CouponResult::try_from(totals),
    }
}
