use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::error::ConfigError;

/// Upstream used when `API_GATEWAY_URL` is unset or empty.
pub const DEFAULT_ENDPOINT: &str =
    "https://xw4u71iygc.execute-api.ap-south-1.amazonaws.com/prod/predict";

pub const ENDPOINT_VAR: &str = "API_GATEWAY_URL";
/// Name the Next.js deployment used; read when `ENDPOINT_VAR` is unset.
pub const LEGACY_ENDPOINT_VAR: &str = "NEXT_PUBLIC_API_GATEWAY_URL";
pub const PORT_VAR: &str = "PORT";
pub const TIMEOUT_VAR: &str = "RELAY_TIMEOUT_MS";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub port: u16,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl RelayConfig {
    /// Reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup, so tests never touch the real environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let configured = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let endpoint = configured(ENDPOINT_VAR)
            .or_else(|| {
                let legacy = configured(LEGACY_ENDPOINT_VAR)?;
                info!("{ENDPOINT_VAR} not set, using {LEGACY_ENDPOINT_VAR}");
                Some(legacy)
            })
            .unwrap_or_else(|| {
                info!("{ENDPOINT_VAR} not set, using default: {DEFAULT_ENDPOINT}");
                DEFAULT_ENDPOINT.to_string()
            });

        let port = try_load(&lookup, PORT_VAR, DEFAULT_PORT)?;
        let timeout_ms: u64 = try_load(&lookup, TIMEOUT_VAR, DEFAULT_TIMEOUT_MS)?;

        Ok(Self {
            port,
            endpoint,
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(key).filter(|value| !value.trim().is_empty()) else {
        info!("{key} not set, using default: {default}");
        return Ok(default);
    };

    raw.trim().parse().map_err(|err: T::Err| {
        warn!("Invalid {key} value: {err}");
        ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: err.to_string(),
        }
    })
}
