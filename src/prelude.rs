//! Jaz Checkout prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    api::{ApiError, HttpMarketplaceClient, client::MarketplaceConfig},
    checkout::{
        CheckoutContext, CheckoutError, CheckoutPhase, CheckoutSession, CheckoutSettings,
        CouponCheck, PaymentStatus,
    },
    coupons::{CouponError, CouponResult, PricingService},
    draft::OrderDraft,
    location::{
        Coordinate, LiveLocation, LocationChoice, LocationError, LocationPolicy, SavedAddress,
    },
    orders::{OrderConfirmation, OrderRequest, OrdersService, SubmissionError},
    payments::{
        PaymentError, PaymentGateway, PaymentMethod, PaymentOutcome, PaymentRequest,
        ProviderResult, ProviderStatus,
    },
    schedule::{Schedule, ScheduleError},
    services::{NewServiceSelection, ServiceSelection},
    totals::{Totals, compute_totals},
    validation::ValidationError,
};
