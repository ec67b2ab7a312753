//! Local validation failures
//!
//! Everything here is detected before any network call and is never sent to
//! the backend or the payment provider.

use thiserror::Error;

use crate::{location::LocationError, schedule::ScheduleError};

/// A required selection or input is missing or malformed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// The draft has no service line.
    #[error("no service has been selected")]
    MissingService,

    /// The draft has no location choice.
    #[error("no location has been selected")]
    MissingLocation,

    /// A required identifier or title was blank.
    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    /// Service quantity was zero.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// Service unit price was negative.
    #[error("price must not be negative")]
    NegativePrice,

    /// Service unit price was in a currency other than the marketplace currency (price currency,
    /// marketplace currency).
    #[error("price is in {0}, but orders are priced in {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Coupon code was empty after trimming.
    #[error("coupon code must not be empty")]
    EmptyCouponCode,

    /// No payment method was selected.
    #[error("no payment method has been selected")]
    NoPaymentMethod,

    /// The location could not be resolved to coordinates.
    #[error(transparent)]
    Location(#[from] LocationError),

    /// The schedule could not be parsed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}
