use std::marker::PhantomData;
use std::time::Duration;

use pagewise_core::{ClientConfiguration, ConfigError, validate_config};
use url::Url;

use crate::fetcher::HttpPageFetcher;
use crate::{
    DEFAULT_ITEMS_FIELD, DEFAULT_NEXT_TOKEN_FIELD, DEFAULT_SECURITY_HEADER, DEFAULT_TOKEN_PARAM,
};

/// Builder for [`HttpPageFetcher`].
///
/// The base address and security identifier normally come from the same
/// [`ClientConfiguration`] the pagewise client was built from, via
/// [`configuration`](Self::configuration).
#[derive(Debug, Clone)]
pub struct HttpPageFetcherBuilder {
    base: Option<String>,
    security_id: Option<String>,
    security_header: String,
    token_param: String,
    items_field: String,
    next_field: String,
    timeout: Option<Duration>,
    http: Option<reqwest::Client>,
}

impl Default for HttpPageFetcherBuilder {
    fn default() -> Self {
        Self {
            base: None,
            security_id: None,
            security_header: DEFAULT_SECURITY_HEADER.to_string(),
            token_param: DEFAULT_TOKEN_PARAM.to_string(),
            items_field: DEFAULT_ITEMS_FIELD.to_string(),
            next_field: DEFAULT_NEXT_TOKEN_FIELD.to_string(),
            timeout: None,
            http: None,
        }
    }
}

impl HttpPageFetcherBuilder {
    /// Builder with default field names and no address or credential.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the base address and security identifier from a configuration.
    #[must_use]
    pub fn configuration(mut self, cfg: &ClientConfiguration) -> Self {
        self.base.clone_from(&cfg.api_endpoint);
        self.security_id.clone_from(&cfg.security_id);
        self
    }

    /// Set the base address endpoints are resolved against.
    #[must_use]
    pub fn base_url(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Set the security identifier sent with every request.
    #[must_use]
    pub fn security_id(mut self, id: impl Into<String>) -> Self {
        self.security_id = Some(id.into());
        self
    }

    /// Header carrying the security identifier (default `X-Security-Id`).
    #[must_use]
    pub fn security_header(mut self, name: impl Into<String>) -> Self {
        self.security_header = name.into();
        self
    }

    /// Query parameter carrying the continuation token (default `page_token`).
    #[must_use]
    pub fn token_param(mut self, name: impl Into<String>) -> Self {
        self.token_param = name.into();
        self
    }

    /// JSON field holding a page's items (default `items`).
    #[must_use]
    pub fn items_field(mut self, name: impl Into<String>) -> Self {
        self.items_field = name.into();
        self
    }

    /// JSON field holding the next continuation token (default `next_page_token`).
    #[must_use]
    pub fn next_token_field(mut self, name: impl Into<String>) -> Self {
        self.next_field = name.into();
        self
    }

    /// Per-request timeout applied when the builder creates its own HTTP client.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Use a preconfigured `reqwest` client instead of creating one.
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the fetcher.
    ///
    /// # Errors
    /// Returns `MissingCredential` or `MissingEndpoint` under the same rules
    /// as client construction, or `MissingEndpoint` if the HTTP client cannot
    /// be created.
    pub fn build<T>(self) -> Result<HttpPageFetcher<T>, ConfigError> {
        // Throttle limits are unused here; defaults pass validation.
        let candidate = ClientConfiguration {
            security_id: self.security_id,
            api_endpoint: self.base,
            throttle: Some(pagewise_core::ThrottleParameters::default()),
        };
        let (cfg, base) = validate_config(candidate)?.into_parts();
        let base = with_trailing_slash(base);

        let http = match self.http {
            Some(http) => http,
            None => {
                let mut b = reqwest::Client::builder();
                if let Some(t) = self.timeout {
                    b = b.timeout(t);
                }
                b.build()
                    .map_err(|e| ConfigError::endpoint(format!("HTTP client: {e}")))?
            }
        };

        Ok(HttpPageFetcher {
            http,
            base,
            security_id: cfg.security_id_str().to_string(),
            security_header: self.security_header,
            token_param: self.token_param,
            items_field: self.items_field,
            next_field: self.next_field,
            _items: PhantomData,
        })
    }
}

// `Url::join` replaces the last segment unless the base ends in a slash.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
