use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use pagewise_core::{ContinuationToken, Page, PageFetcher, PagewiseError};

use crate::envelope::decode_page;

/// `PageFetcher` issuing `GET` requests against a JSON API.
///
/// One fetcher serves every endpoint under its base address; the item type
/// is fixed per fetcher. Build one with
/// [`HttpPageFetcherBuilder`](crate::HttpPageFetcherBuilder).
pub struct HttpPageFetcher<T> {
    pub(crate) http: reqwest::Client,
    pub(crate) base: Url,
    pub(crate) security_id: String,
    pub(crate) security_header: String,
    pub(crate) token_param: String,
    pub(crate) items_field: String,
    pub(crate) next_field: String,
    pub(crate) _items: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for HttpPageFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("base", &self.base.as_str())
            .field("security_header", &self.security_header)
            .field("token_param", &self.token_param)
            .field("items_field", &self.items_field)
            .finish_non_exhaustive()
    }
}

impl<T> HttpPageFetcher<T> {
    /// Base address endpoints are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for `endpoint`.
    ///
    /// The result always stays under the base address, so the security
    /// identifier is never sent to another host or outside the base path.
    ///
    /// # Errors
    /// Returns `Other` when `endpoint` cannot be joined onto the base address
    /// or resolves outside it.
    pub fn url_for(&self, endpoint: &str) -> Result<Url, PagewiseError> {
        let url = self
            .base
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| PagewiseError::Other(format!("invalid endpoint {endpoint:?}: {e}")))?;
        if url.origin() != self.base.origin() || !url.path().starts_with(self.base.path()) {
            return Err(PagewiseError::Other(format!(
                "endpoint {endpoint:?} resolves outside {}",
                self.base
            )));
        }
        Ok(url)
    }
}

#[async_trait]
impl<T> PageFetcher<T> for HttpPageFetcher<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn name(&self) -> &'static str {
        "pagewise-http"
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "pagewise_http::fetch",
            skip_all,
            fields(endpoint = %endpoint, continued = token.is_some()),
        )
    )]
    async fn fetch(
        &self,
        endpoint: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, PagewiseError> {
        let url = self.url_for(endpoint)?;
        let mut req = self
            .http
            .get(url)
            .header(self.security_header.as_str(), self.security_id.as_str());
        if let Some(token) = token {
            req = req.query(&[(self.token_param.as_str(), token.as_str())]);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PagewiseError::transport(e.to_string()))?;
        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PagewiseError::transport(e.to_string()))?;

        if !status.is_success() {
            #[cfg(feature = "tracing")]
            tracing::warn!(status = status.as_u16(), "page request rejected");
            let message = String::from_utf8_lossy(&bytes).trim().to_string();
            let message = if message.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                message
            };
            return Err(PagewiseError::server(status.as_u16(), message));
        }

        decode_page(&bytes, &self.items_field, &self.next_field)
    }
}
