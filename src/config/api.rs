//! Marketplace API Config

use std::time::Duration;

use clap::Args;

use crate::api::client::MarketplaceConfig;

/// Marketplace backend settings.
#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// API base URL
    #[arg(long, env = "JAZ_API_URL")]
    pub api_url: String,

    /// Bearer token of the signed-in customer
    #[arg(long, env = "JAZ_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "JAZ_API_TIMEOUT_SECS", default_value_t = 30_u64)]
    pub api_timeout_secs: u64,
}

impl From<ApiConfig> for MarketplaceConfig {
    fn from(config: ApiConfig) -> Self {
        Self {
            base_url: config.api_url,
            token: config.api_token.filter(|token| !token.trim().is_empty()),
            timeout: Duration::from_secs(config.api_timeout_secs),
        }
    }
}
