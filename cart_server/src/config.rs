//! Server configuration.
//!
//! Everything is read from environment variables (a `.env` file is loaded first by `main`). Invalid or missing values
//! fall back to defaults, with a log message saying so. Run the server with any argument to see the full list.
use std::{env, fmt::Display, str::FromStr};

use chrono::Duration;

use cart_common::helpers::env_flag;
use cart_engine::events::DEFAULT_BROADCAST_BUFFER;
use log::*;
use stripe_tools::StripeConfig;

const DEFAULT_CART_HOST: &str = "127.0.0.1";
const DEFAULT_CART_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/cart_store.db";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_SESSION_IDLE_MINUTES: i64 = 24 * 60;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// The externally visible root URL of the server. The payment processor sends shoppers back here.
    pub public_url: String,
    pub db_max_connections: u32,
    /// How many cart events each topic buffers for subscribers that are slow to read.
    pub broadcast_buffer: usize,
    /// Mark the session cookie `Secure`. Turn on whenever the server is behind TLS.
    pub secure_cookies: bool,
    /// Session carts that have not changed for this long are forgotten.
    pub session_idle_timeout: Duration,
    pub stripe: StripeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CART_HOST.to_string(),
            port: DEFAULT_CART_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            public_url: format!("http://{DEFAULT_CART_HOST}:{DEFAULT_CART_PORT}"),
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            broadcast_buffer: DEFAULT_BROADCAST_BUFFER,
            secure_cookies: false,
            session_idle_timeout: Duration::minutes(DEFAULT_SESSION_IDLE_MINUTES),
            stripe: StripeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, public_url: format!("http://{host}:{port}"), ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CART_HOST").ok().unwrap_or_else(|| DEFAULT_CART_HOST.into());
        let port = parse_env("CART_PORT", DEFAULT_CART_PORT);
        let database_url = env::var("CART_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ CART_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let public_url = env::var("CART_PUBLIC_URL").ok().unwrap_or_else(|| {
            let url = format!("http://{host}:{port}");
            info!("🪛️ CART_PUBLIC_URL is not set. Payment return URLs will point at {url}.");
            url
        });
        let db_max_connections = parse_env("CART_DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS);
        let broadcast_buffer = parse_env("CART_BROADCAST_BUFFER", DEFAULT_BROADCAST_BUFFER);
        let secure_cookies = env_flag("CART_SECURE_COOKIES", false);
        if !secure_cookies {
            info!("🪛️ Session cookies are not marked Secure. Set CART_SECURE_COOKIES=1 when serving over TLS.");
        }
        let idle_minutes = parse_env("CART_SESSION_IDLE_TIMEOUT", DEFAULT_SESSION_IDLE_MINUTES).max(1);
        let session_idle_timeout = Duration::minutes(idle_minutes);
        let stripe = StripeConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            public_url,
            db_max_connections,
            broadcast_buffer,
            secure_cookies,
            session_idle_timeout,
            stripe,
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {name}. {e} Using the default, {default}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {name} is not set. Using the default, {default}.");
            default
        },
    }
}
