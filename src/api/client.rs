//! HTTP client for the marketplace backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    api::ApiError,
    coupons::{CouponCheckRequest, CouponCheckResponse, PricingService},
    orders::{OrderRequest, OrdersService},
};

const COUPON_CHECK_PATH: &str = "coupons/check";
const ORDERS_PATH: &str = "orders";

/// Configuration for connecting to the marketplace backend.
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// API base URL, e.g. `"https://api.example.com/v1"`.
    pub base_url: String,

    /// Bearer token of the signed-in customer.
    pub token: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// HTTP implementation of the pricing and orders services.
#[derive(Debug, Clone)]
pub struct HttpMarketplaceClient {
    config: MarketplaceConfig,
    http: Client,
}

impl HttpMarketplaceClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the HTTP client cannot be initialised.
    pub fn new(config: MarketplaceConfig) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = self
            .http
            .post(self.url(path))
            .header(header::ACCEPT, "application/json")
            .json(body);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(path, status = status.as_u16(), "marketplace response");

        decode_body(status, &text)
    }
}

/// Decode a response body.
///
/// The backend reports business failures (rejected coupon, refused order) as a
/// JSON envelope, sometimes with a non-success status; those bodies are
/// decoded either way. Anything else with a bad status is a status error.
fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, ApiError> {
    match serde_json::from_str(text) {
        Ok(body) => Ok(body),
        Err(_) if !status.is_success() => Err(ApiError::Status(status.as_u16(), text.to_string())),
        Err(error) => Err(ApiError::UnexpectedResponse(error.to_string())),
    }
}

#[async_trait]
impl PricingService for HttpMarketplaceClient {
    #[tracing::instrument(
        name = "api.check_coupon",
        skip(self, request),
        fields(lines = request.extra.len()),
        err
    )]
    async fn check_coupon(
        &self,
        request: &CouponCheckRequest,
    ) -> Result<CouponCheckResponse, ApiError> {
        self.post(COUPON_CHECK_PATH, request).await
    }
}

#[async_trait]
impl OrdersService for HttpMarketplaceClient {
    #[tracing::instrument(name = "api.create_order", skip(self, request), err)]
    async fn create_order(&self, request: &OrderRequest) -> Result<Value, ApiError> {
        self.post(ORDERS_PATH, request).await
    }
}
