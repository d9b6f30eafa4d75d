use pagewise_types::{ClientConfiguration, ConfigError, ThrottleParameters};
use url::Url;

/// A configuration that passed [`validate_config`], together with the values
/// validation derived from it.
///
/// Only [`validate_config`] creates one, so holders never re-check or
/// re-parse anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    config: ClientConfiguration,
    base_url: Url,
    throttle: ThrottleParameters,
}

impl ValidatedConfig {
    /// The configuration as supplied.
    #[must_use]
    pub const fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    /// The parsed API base address.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The checked, strictly positive throttle limits.
    #[must_use]
    pub const fn throttle(&self) -> &ThrottleParameters {
        &self.throttle
    }

    /// Split into the configuration and the parsed base address.
    #[must_use]
    pub fn into_parts(self) -> (ClientConfiguration, Url) {
        (self.config, self.base_url)
    }
}

/// Validate a client configuration once, before any request is issued.
///
/// Checks run in order: credential, endpoint, throttle parameters. The first
/// failure is returned. On success the configuration is returned unchanged.
///
/// # Errors
/// - `MissingCredential` when the security identifier is absent or blank.
/// - `MissingEndpoint` when the endpoint is absent, blank, or not an absolute
///   `http`/`https` base address.
/// - `MissingThrottleParameters` when throttle parameters are absent or any
///   limit is zero.
pub fn validate(config: ClientConfiguration) -> Result<ClientConfiguration, ConfigError> {
    validate_config(config).map(|v| v.config)
}

/// Validate a configuration and keep what validation derived from it.
///
/// Same checks and order as [`validate`].
///
/// # Errors
/// See [`validate`].
pub fn validate_config(config: ClientConfiguration) -> Result<ValidatedConfig, ConfigError> {
    if config.security_id_str().trim().is_empty() {
        return Err(ConfigError::MissingCredential);
    }
    let base_url = parse_endpoint(config.api_endpoint_str())?;
    let throttle = *validate_throttle(config.throttle.as_ref())?;
    Ok(ValidatedConfig {
        config,
        base_url,
        throttle,
    })
}

/// Parse an API endpoint into a base URL.
///
/// # Errors
/// Returns `MissingEndpoint` when the value is blank, unparsable, uses a
/// scheme other than `http`/`https`, or cannot act as a base address.
pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::endpoint("API endpoint is empty"));
    }
    let url = Url::parse(raw).map_err(|e| ConfigError::endpoint(format!("{raw:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::endpoint(format!(
            "unsupported scheme {:?}",
            url.scheme()
        )));
    }
    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::endpoint(format!("{raw:?} is not a base address")));
    }
    Ok(url)
}

/// Check that throttle parameters are present and strictly positive.
///
/// # Errors
/// Returns `MissingThrottleParameters` naming the first offending field.
pub fn validate_throttle(
    params: Option<&ThrottleParameters>,
) -> Result<&ThrottleParameters, ConfigError> {
    let Some(params) = params else {
        return Err(ConfigError::throttle("throttle parameters are not set"));
    };
    if params.max_concurrent == 0 {
        return Err(ConfigError::throttle("max_concurrent must be positive"));
    }
    if params.max_per_interval == 0 {
        return Err(ConfigError::throttle("max_per_interval must be positive"));
    }
    if params.interval.is_zero() {
        return Err(ConfigError::throttle("interval must be positive"));
    }
    Ok(params)
}
