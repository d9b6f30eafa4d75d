use std::sync::Arc;
use std::time::Duration;

use pagewise_core::{PageCursor, PageFetcher, Throttler, validate_config};
use pagewise_types::{ClientConfiguration, ConfigError, ThrottleParameters};
use url::Url;

/// Entry point for paginated, throttled access to one remote API.
///
/// A client owns exactly one [`Throttler`]; every cursor it creates shares it.
pub struct Client {
    pub(crate) cfg: Arc<ClientConfiguration>,
    pub(crate) base_url: Url,
    pub(crate) throttler: Arc<Throttler>,
}

/// Builder for constructing a [`Client`] from a configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    cfg: ClientConfiguration,
}

impl ClientBuilder {
    /// Create a builder with nothing set.
    ///
    /// Behavior and trade-offs:
    /// - Starts with no credential, no endpoint and no throttle parameters; all
    ///   three must be supplied before [`build`](Self::build) succeeds.
    /// - Use [`default_throttle`](Self::default_throttle) for conservative
    ///   limits (10 concurrent, 200 per minute).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one deserialized from a file.
    #[must_use]
    pub const fn from_configuration(cfg: ClientConfiguration) -> Self {
        Self { cfg }
    }

    /// Set the opaque security identifier sent with every request.
    #[must_use]
    pub fn security_id(mut self, security_id: impl Into<String>) -> Self {
        self.cfg.security_id = Some(security_id.into());
        self
    }

    /// Set the base address of the remote API.
    #[must_use]
    pub fn api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.cfg.api_endpoint = Some(endpoint.into());
        self
    }

    /// Replace the throttle parameters.
    #[must_use]
    pub const fn throttle(mut self, params: ThrottleParameters) -> Self {
        self.cfg.throttle = Some(params);
        self
    }

    /// Use [`ThrottleParameters::default`].
    #[must_use]
    pub fn default_throttle(self) -> Self {
        self.throttle(ThrottleParameters::default())
    }

    /// Shortcut: set the concurrency limit (preserves the other limits if already set).
    #[must_use]
    pub fn max_concurrent(mut self, max_concurrent: u32) -> Self {
        let mut params = self.cfg.throttle.unwrap_or_default();
        params.max_concurrent = max_concurrent;
        self.cfg.throttle = Some(params);
        self
    }

    /// Shortcut: set the per-interval request budget (preserves the other limits if already set).
    #[must_use]
    pub fn max_per_interval(mut self, max_per_interval: u32) -> Self {
        let mut params = self.cfg.throttle.unwrap_or_default();
        params.max_per_interval = max_per_interval;
        self.cfg.throttle = Some(params);
        self
    }

    /// Shortcut: set the rate window length (preserves the other limits if already set).
    #[must_use]
    pub fn interval(mut self, interval: Duration) -> Self {
        let mut params = self.cfg.throttle.unwrap_or_default();
        params.interval = interval;
        self.cfg.throttle = Some(params);
        self
    }

    /// Validate the configuration and build the client.
    ///
    /// Validation runs exactly once, here; no request is issued.
    ///
    /// # Errors
    /// Returns the first [`ConfigError`] found: missing credential, missing or
    /// malformed endpoint, or missing / non-positive throttle parameters.
    pub fn build(self) -> Result<Client, ConfigError> {
        let validated = validate_config(self.cfg)?;
        let throttler = Throttler::for_config(&validated);
        let (cfg, base_url) = validated.into_parts();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            endpoint = %base_url,
            max_concurrent = throttler.parameters().max_concurrent,
            max_per_interval = throttler.parameters().max_per_interval,
            interval_ms = u64::try_from(throttler.parameters().interval.as_millis())
                .unwrap_or(u64::MAX),
            "client built"
        );

        Ok(Client {
            cfg: Arc::new(cfg),
            base_url,
            throttler: Arc::new(throttler),
        })
    }
}

impl Client {
    /// Start building a new client.
    ///
    /// ```rust,ignore
    /// let client = pagewise::Client::builder()
    ///     .security_id("AK...")
    ///     .api_endpoint("https://data.example.com/v2/")
    ///     .max_concurrent(4)
    ///     .max_per_interval(200)
    ///     .interval(std::time::Duration::from_secs(60))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The validated configuration, shared read-only.
    #[must_use]
    pub fn configuration(&self) -> &Arc<ClientConfiguration> {
        &self.cfg
    }

    /// The parsed API base address.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The throttler shared by every request this client issues.
    #[must_use]
    pub const fn throttler(&self) -> &Arc<Throttler> {
        &self.throttler
    }

    /// Create a raw page cursor over `endpoint`.
    pub fn cursor<T: Send>(
        &self,
        fetcher: Arc<dyn PageFetcher<T>>,
        endpoint: impl Into<String>,
    ) -> PageCursor<T> {
        PageCursor::new(fetcher, Arc::clone(&self.throttler), endpoint)
    }

    /// Stop admitting requests: pending and future permit requests resolve to
    /// `PagewiseError::Cancelled`. Requests already in flight complete.
    pub fn shutdown(&self) {
        self.throttler.close();
    }
}
