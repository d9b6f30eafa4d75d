//! Client configuration primitives.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Limits applied by the client-wide throttler.
///
/// All three fields must be positive. A zero value is rejected when the
/// client is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleParameters {
    /// Maximum number of requests that may be in flight at the same time.
    pub max_concurrent: u32,
    /// Maximum number of requests that may start within one `interval`.
    pub max_per_interval: u32,
    /// Length of the rate accounting window.
    pub interval: Duration,
}

impl ThrottleParameters {
    /// Build throttle parameters from explicit limits.
    #[must_use]
    pub const fn new(max_concurrent: u32, max_per_interval: u32, interval: Duration) -> Self {
        Self {
            max_concurrent,
            max_per_interval,
            interval,
        }
    }
}

impl Default for ThrottleParameters {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            max_per_interval: 200,
            interval: Duration::from_secs(60),
        }
    }
}

/// Configuration handed to the client builder.
///
/// Every field is optional so that partially populated configurations (for
/// example, deserialized from a file with missing keys) can be represented and
/// rejected with a precise error. Once validated the configuration is shared
/// read-only for the lifetime of the client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientConfiguration {
    /// Opaque credential handle sent with every request.
    #[serde(default)]
    pub security_id: Option<String>,
    /// Base address of the remote API, e.g. `https://data.example.com/v2/`.
    #[serde(default)]
    pub api_endpoint: Option<String>,
    /// Concurrency and rate limits applied to outgoing requests.
    #[serde(default)]
    pub throttle: Option<ThrottleParameters>,
}

impl ClientConfiguration {
    /// Fully populated configuration with default throttle parameters.
    pub fn new(security_id: impl Into<String>, api_endpoint: impl Into<String>) -> Self {
        Self {
            security_id: Some(security_id.into()),
            api_endpoint: Some(api_endpoint.into()),
            throttle: Some(ThrottleParameters::default()),
        }
    }

    /// Replace the throttle parameters.
    #[must_use]
    pub const fn with_throttle(mut self, throttle: ThrottleParameters) -> Self {
        self.throttle = Some(throttle);
        self
    }

    /// Security identifier, or an empty string when unset.
    #[must_use]
    pub fn security_id_str(&self) -> &str {
        self.security_id.as_deref().unwrap_or_default()
    }

    /// API endpoint, or an empty string when unset.
    #[must_use]
    pub fn api_endpoint_str(&self) -> &str {
        self.api_endpoint.as_deref().unwrap_or_default()
    }
}
