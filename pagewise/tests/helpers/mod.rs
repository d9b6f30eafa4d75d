// Shared fixtures for the aggregate tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use pagewise::{Client, PageFetcher, Symbol, ThrottleParameters};
use pagewise_mock::{FetchCall, MockPageFetcher};

pub const AAPL: &str = "AAPL";
pub const MSFT: &str = "MSFT";
pub const TSLA: &str = "TSLA";

pub const ENDPOINT: &str = "https://data.example.com/v2/";

/// Parse a fixture symbol.
pub fn sym(s: &str) -> Symbol {
    Symbol::new(s).expect("fixture symbol")
}

/// Endpoint used for per-symbol trade listings.
pub fn trades_endpoint(symbol: &Symbol) -> String {
    format!("stocks/{symbol}/trades")
}

/// Client with generous limits that never get in the way.
pub fn client() -> Client {
    client_with(ThrottleParameters::new(64, 10_000, Duration::from_secs(1)))
}

/// Client with explicit throttle limits.
pub fn client_with(params: ThrottleParameters) -> Client {
    Client::builder()
        .security_id("test-key")
        .api_endpoint(ENDPOINT)
        .throttle(params)
        .build()
        .expect("valid test configuration")
}

/// Upcast a mock to the trait object the client consumes.
pub fn as_fetcher<T>(mock: &Arc<MockPageFetcher<T>>) -> Arc<dyn PageFetcher<T>>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::clone(mock) as Arc<dyn PageFetcher<T>>
}

/// Largest number of calls that started within any trailing `window`.
pub fn max_calls_in_window(calls: &[FetchCall], window: Duration) -> usize {
    calls
        .iter()
        .map(|c| {
            calls
                .iter()
                .filter(|o| o.at >= c.at && o.at.duration_since(c.at) < window)
                .count()
        })
        .max()
        .unwrap_or(0)
}
