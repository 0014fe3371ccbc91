use std::{env, time::Duration};

use cart_common::{Secret, DEFAULT_CURRENCY_CODE};
use log::*;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Base URL of the REST API. Overridden in tests to point at a local mock server.
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// ISO currency code (lower case) that all prices are quoted in.
    pub currency: String,
    /// Timeout applied to every request to the processor.
    pub timeout: Duration,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_STRIPE_API_URL.to_string(),
            secret_key: Secret::default(),
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl StripeConfig {
    pub fn new(api_url: &str, secret_key: &str) -> Self {
        Self { api_url: api_url.to_string(), secret_key: Secret::new(secret_key.to_string()), ..Default::default() }
    }

    pub fn new_from_env_or_default() -> Self {
        let secret_key = Secret::new(env::var("STRIPE_SECRET_KEY").unwrap_or_else(|_| {
            warn!("🪛️ STRIPE_SECRET_KEY not set. Checkout will fail until it is configured.");
            String::default()
        }));
        let api_url = env::var("CART_STRIPE_API_URL").unwrap_or_else(|_| {
            debug!("🪛️ CART_STRIPE_API_URL not set, using {DEFAULT_STRIPE_API_URL}");
            DEFAULT_STRIPE_API_URL.to_string()
        });
        let currency = env::var("CART_STRIPE_CURRENCY").map(|s| s.to_lowercase()).unwrap_or_else(|_| {
            debug!("🪛️ CART_STRIPE_CURRENCY not set, using {DEFAULT_CURRENCY_CODE}");
            DEFAULT_CURRENCY_CODE.to_string()
        });
        let timeout = env::var("CART_STRIPE_TIMEOUT")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for CART_STRIPE_TIMEOUT. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { api_url, secret_key, currency, timeout }
    }

    pub fn is_configured(&self) -> bool {
        !self.secret_key.is_blank()
    }
}
