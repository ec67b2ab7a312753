//! Payment provider seam.

use async_trait::async_trait;
use mockall::automock;

use crate::payments::{PaymentMethod, PaymentRequest, ProviderResult};

/// The external payment provider.
///
/// Implementations open the provider's collection step (card form, wallet
/// sheet) and resolve exactly once with the provider's raw result. Failure
/// messages are passed through as received; the checkout session decodes them.
#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Collect and authorize a payment.
    async fn authorize(&self, request: &PaymentRequest, method: PaymentMethod) -> ProviderResult;

    /// Tear down any collection step still on screen.
    async fn dismiss(&self);
}
