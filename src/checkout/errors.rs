//! Checkout errors.

use thiserror::Error;

use crate::{
    api::ApiError,
    coupons::CouponError,
    orders::{SubmissionError, UNRECOGNIZED_RESPONSE},
    payments::{PaymentError, PaymentRequestError},
    totals::TotalsError,
    validation::ValidationError,
};

const CONNECTION_FAILED: &str = "could not reach the server, please try again";

/// Everything a checkout operation can fail with.
///
/// None of these end the session; each maps to a message via
/// [`CheckoutError::user_message`].
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// Local validation failed; nothing was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The coupon check failed.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// The payment provider reported a failure.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// The payment request could not be built. Points at misconfiguration.
    #[error("payment request misconfigured: {0}")]
    PaymentRequest(#[from] PaymentRequestError),

    /// The order was not created.
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    /// Totals could not be calculated.
    #[error(transparent)]
    Totals(#[from] TotalsError),

    /// A payment or submission for this session is still outstanding.
    #[error("a payment is already in progress")]
    InProgress,

    /// The order was already placed; the session no longer accepts changes.
    #[error("this order has already been placed")]
    SessionClosed,
}

impl CheckoutError {
    /// Message suitable for showing to the user.
    ///
    /// Server and provider messages are passed through; transport details are
    /// replaced by a generic message.
    pub fn user_message(&self) -> String {
        match self {
            Self::Coupon(CouponError::Api(error)) | Self::Submission(SubmissionError::Api(error)) => {
                match error {
                    ApiError::Timeout => error.to_string(),
                    ApiError::Status(..) | ApiError::UnexpectedResponse(_) => {
                        UNRECOGNIZED_RESPONSE.to_string()
                    }
                    ApiError::Transport(_) => CONNECTION_FAILED.to_string(),
                }
            }
            _ => self.to_string(),
        }
    }
}
