//! Orders

pub mod request;
pub mod response;
pub mod service;

pub use request::{AddressBookFields, OrderRequest};
pub use response::{
    OrderConfirmation, SubmissionError, UNRECOGNIZED_RESPONSE, interpret_order_response,
};
pub use service::{MockOrdersService, OrdersService};

/// Send an order creation request and interpret the answer.
///
/// # Errors
///
/// Returns a [`SubmissionError`] when the request fails or the server does not
/// confirm the order.
#[tracing::instrument(
    name = "orders.submit",
    skip(orders, request),
    fields(payment_type = request.payment_type, qty = request.qty),
    err
)]
pub async fn submit_order(
    orders: &dyn OrdersService,
    request: &OrderRequest,
) -> Result<OrderConfirmation, SubmissionError> {
    let body = orders.create_order(request).await?;

    interpret_order_response(body)
}
