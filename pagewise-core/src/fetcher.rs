use async_trait::async_trait;
use pagewise_types::{ContinuationToken, Page, PagewiseError};

/// Performs a single page request against a remote endpoint.
///
/// Implementations issue exactly one call per invocation and do not retry;
/// retry policy, if any, belongs to the transport underneath. The token, when
/// present, must be forwarded verbatim.
#[async_trait]
pub trait PageFetcher<T: Send>: Send + Sync {
    /// Short, human-readable name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Fetch one page from `endpoint`, continuing from `token` when given.
    ///
    /// A `None` token requests the first page.
    async fn fetch(
        &self,
        endpoint: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<Page<T>, PagewiseError>;
}
