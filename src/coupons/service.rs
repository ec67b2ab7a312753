//! Pricing service seam.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    api::ApiError,
    coupons::{CouponCheckRequest, CouponCheckResponse},
};

/// Server-side coupon pricing.
#[automock]
#[async_trait]
pub trait PricingService: Send + Sync {
    /// Ask the backend to price the given service lines with a coupon code.
    async fn check_coupon(
        &self,
        request: &CouponCheckRequest,
    ) -> Result<CouponCheckResponse, ApiError>;
}
