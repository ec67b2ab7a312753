//! Orders service seam.

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;

use crate::{api::ApiError, orders::OrderRequest};

/// Server-side order creation.
#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Send an order creation request and return the raw response body.
    async fn create_order(&self, request: &OrderRequest) -> Result<Value, ApiError>;
}
