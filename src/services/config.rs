// Configuration loaded from the environment
//
// Design Decision: Environment variables (with optional .env file)
//
// Secrets (the store anon key) come from the environment and never from
// files in the repository. Everything has a default except the anon key,
// which is only required when a REST store is configured.
//
// Environment Variables:
// - GATEWAY_ADDR (optional): listen address, defaults to 127.0.0.1:8787
// - STORE_URL (optional): PostgREST base URL; unset selects the in-memory store
// - STORE_ANON_KEY (required with STORE_URL): project api key
// - STORE_SEED_FILE (optional): JSON seed for the in-memory store
// - HEALTH_CHECK_TIMEOUT_MS (optional): defaults to 5000
// - TOOL_EXECUTION_TIMEOUT_MS (optional): defaults to 30000
// - TOOL_SIMULATION (optional): "true"/"false", defaults to true

use crate::error::{GatewayError, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8787";
pub const DEFAULT_HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_TOOL_EXECUTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Which record store backs the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process-local tables, optionally seeded from a JSON file
    Memory { seed_file: Option<PathBuf> },

    /// PostgREST-compatible HTTP backend
    Rest { base_url: String, anon_key: String },
}

/// Gateway configuration
///
/// Usage:
/// ```ignore
/// let config = GatewayConfig::from_env()?;
/// let api = AppBuilder::new().with_config(config.clone()).build_async().await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub health_check_timeout: Duration,
    pub tool_execution_timeout: Duration,

    /// Allow tool execution without an endpoint to return a simulated result
    pub tool_simulation: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            store: StoreBackend::Memory { seed_file: None },
            health_check_timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
            tool_execution_timeout: DEFAULT_TOOL_EXECUTION_TIMEOUT,
            tool_simulation: true,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the process environment
    ///
    /// Loads `.env` first (ignored if not found).
    ///
    /// # Errors
    /// - STORE_URL set without STORE_ANON_KEY
    /// - Unparseable address, duration or boolean
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values behave like unset ones
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let bind_addr = var("GATEWAY_ADDR")
            .unwrap_or_else(|| DEFAULT_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| GatewayError::Config(format!("GATEWAY_ADDR is not a socket address: {}", e)))?;

        let store = match var("STORE_URL") {
            Some(base_url) => {
                let anon_key = var("STORE_ANON_KEY").ok_or_else(|| {
                    GatewayError::Env("STORE_ANON_KEY must be set when STORE_URL is set".to_string())
                })?;
                StoreBackend::Rest { base_url, anon_key }
            }
            None => StoreBackend::Memory {
                seed_file: var("STORE_SEED_FILE").map(PathBuf::from),
            },
        };

        let health_check_timeout = parse_millis(
            "HEALTH_CHECK_TIMEOUT_MS",
            var("HEALTH_CHECK_TIMEOUT_MS"),
            DEFAULT_HEALTH_CHECK_TIMEOUT,
        )?;
        let tool_execution_timeout = parse_millis(
            "TOOL_EXECUTION_TIMEOUT_MS",
            var("TOOL_EXECUTION_TIMEOUT_MS"),
            DEFAULT_TOOL_EXECUTION_TIMEOUT,
        )?;

        let tool_simulation = match var("TOOL_SIMULATION") {
            None => true,
            Some(value) => parse_bool("TOOL_SIMULATION", &value)?,
        };

        Ok(Self {
            bind_addr,
            store,
            health_check_timeout,
            tool_execution_timeout,
            tool_simulation,
        })
    }
}

fn parse_millis(name: &str, value: Option<String>, default: Duration) -> Result<Duration> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().parse::<u64>() {
        Ok(0) => Err(GatewayError::Config(format!("{} must be greater than zero", name))),
        Ok(ms) => Ok(Duration::from_millis(ms)),
        Err(e) => Err(GatewayError::Config(format!("{} is not a number of milliseconds: {}", name, e))),
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(GatewayError::Config(format!("{} must be true or false, got '{}'", name, other))),
    }
}
