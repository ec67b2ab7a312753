//! Order creation response interpretation.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::api::ApiError;

/// Message shown when the server's answer cannot be understood.
pub const UNRECOGNIZED_RESPONSE: &str = "unrecognized response from server";

/// The order was not created.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    /// The server answered `status: false`.
    #[error("{}", .0.as_deref().unwrap_or(UNRECOGNIZED_RESPONSE))]
    Rejected(Option<String>),

    /// The body did not have the expected shape.
    #[error("{UNRECOGNIZED_RESPONSE}")]
    Unrecognized,

    /// The request could not be completed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A created order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Server-assigned order identifier.
    pub order_id: String,

    /// Server message, if any.
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    status: bool,

    #[serde(default)]
    message: Option<String>,

    #[serde(default)]
    items: Option<OrderItems>,
}

#[derive(Debug, Deserialize)]
struct OrderItems {
    #[serde(default, alias = "_id")]
    id: Option<String>,
}

/// Interpret an order creation response body.
///
/// # Errors
///
/// - [`SubmissionError::Rejected`]: `status` was `false`, or `true` without an order id.
/// - [`SubmissionError::Unrecognized`]: the body did not have the expected shape.
pub fn interpret_order_response(body: Value) -> Result<OrderConfirmation, SubmissionError> {
    let response: OrderResponse =
        serde_json::from_value(body).map_err(|_error| SubmissionError::Unrecognized)?;

    let message = response.message.filter(|message| !message.trim().is_empty());

    if !response.status {
        return Err(SubmissionError::Rejected(message));
    }

    let order_id = response
        .items
        .and_then(|items| items.id)
        .filter(|id| !id.trim().is_empty());

    match order_id {
        Some(order_id) => Ok(OrderConfirmation { order_id, message }),
        None => Err(SubmissionError::Rejected(message)),
    }
}
