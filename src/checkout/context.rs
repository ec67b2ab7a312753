//! Checkout Context

use std::{fmt, sync::Arc, time::Duration};

use decimal_percentage::Percentage;

use crate::{
    coupons::PricingService,
    location::LocationPolicy,
    orders::OrdersService,
    payments::PaymentGateway,
    totals::standard_tax_rate,
};

/// Default wait for the payment provider before reporting a timeout.
pub const DEFAULT_PAYMENT_TIMEOUT: Duration = Duration::from_secs(300);

/// Policy values a checkout session runs with.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    /// Tax applied to locally estimated totals.
    pub tax_rate: Percentage,

    /// Location policy.
    pub location_policy: LocationPolicy,

    /// Description attached to online payment requests.
    pub payment_description: String,

    /// How long to wait for the payment provider.
    pub payment_timeout: Duration,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            tax_rate: standard_tax_rate(),
            location_policy: LocationPolicy::default(),
            payment_description: "Home service order".to_string(),
            payment_timeout: DEFAULT_PAYMENT_TIMEOUT,
        }
    }
}

/// External collaborators and settings shared by checkout sessions.
#[derive(Clone)]
pub struct CheckoutContext {
    /// Coupon pricing.
    pub pricing: Arc<dyn PricingService>,

    /// Order creation.
    pub orders: Arc<dyn OrdersService>,

    /// Payment provider.
    pub payments: Arc<dyn PaymentGateway>,

    /// Policy values.
    pub settings: CheckoutSettings,
}

impl CheckoutContext {
    /// Bundle collaborators with settings.
    pub fn new(
        pricing: Arc<dyn PricingService>,
        orders: Arc<dyn OrdersService>,
        payments: Arc<dyn PaymentGateway>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            pricing,
            orders,
            payments,
            settings,
        }
    }
}

impl fmt::Debug for CheckoutContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutContext")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
