//! Jaz Checkout
//!
//! Checkout core of an on-demand home-services marketplace: totals, location
//! resolution, the order draft, coupon reconciliation, the payment state machine
//! and order submission.
//!
//! The backend and the payment provider sit behind async service traits
//! ([`coupons::PricingService`], [`orders::OrdersService`],
//! [`payments::PaymentGateway`]); [`api::HttpMarketplaceClient`] implements the
//! first two over HTTP.

pub mod api;
pub mod checkout;
pub mod config;
pub mod coupons;
pub mod draft;
pub mod location;
pub mod money;
pub mod observability;
pub mod orders;
pub mod payments;
pub mod prelude;
pub mod schedule;
pub mod services;
pub mod totals;
pub mod validation;
