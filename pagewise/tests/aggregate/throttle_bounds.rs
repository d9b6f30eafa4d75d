use std::time::Duration;

use pagewise::ThrottleParameters;
use pagewise::util::count_dictionary;
use pagewise_mock::{MockPageFetcher, trade_pages};
use tokio::time::Instant;

use crate::helpers::{as_fetcher, client_with, max_calls_in_window, sym, trades_endpoint};

const SYMBOLS: [&str; 6] = ["AAPL", "MSFT", "TSLA", "AMZN", "NVDA", "GOOG"];

#[tokio::test(start_paused = true)]
async fn concurrent_symbols_respect_both_limits() {
    let mut builder = MockPageFetcher::builder().latency(Duration::from_millis(100));
    for s in SYMBOLS {
        builder = builder.pages(format!("stocks/{s}/trades"), trade_pages(s, &[2, 2, 2, 2, 1]));
    }
    let mock = builder.build();
    let client = client_with(ThrottleParameters::new(3, 4, Duration::from_millis(500)));

    let start = Instant::now();
    let mut streams =
        client.dictionary_of_lists(as_fetcher(&mock), SYMBOLS.map(sym), trades_endpoint);
    let totals = count_dictionary(&mut streams).await;

    for s in SYMBOLS {
        assert_eq!(totals[&sym(s)], Ok(9), "{s}");
    }
    assert_eq!(mock.call_count(), 30);
    assert!(mock.peak_in_flight() <= 3, "peak {}", mock.peak_in_flight());
    assert!(mock.peak_in_flight() >= 2, "symbols overlap");

    let calls = mock.calls();
    assert!(max_calls_in_window(&calls, Duration::from_millis(500)) <= 4);
    // 30 grants at 4 per 500ms need at least 7 full windows.
    assert!(start.elapsed() >= Duration::from_millis(3_500));
    assert_eq!(client.throttler().in_flight(), 0);
}

#[tokio::test(start_paused = true)]
async fn concurrency_slot_frees_before_the_rate_window_rolls() {
    let mock = MockPageFetcher::builder()
        .latency(Duration::from_millis(10))
        .pages("stocks/AAPL/trades", trade_pages("AAPL", &[1, 1, 1]))
        .build();
    let client = client_with(ThrottleParameters::new(1, 10, Duration::from_secs(60)));

    let mut streams = client.dictionary_of_lists(as_fetcher(&mock), [sym("AAPL")], trades_endpoint);
    let totals = count_dictionary(&mut streams).await;

    assert_eq!(totals[&sym("AAPL")], Ok(3));
    assert_eq!(client.throttler().in_flight(), 0);
    assert_eq!(client.throttler().granted_in_window(), 3);

    let calls = mock.calls();
    let span = calls[2].at.duration_since(calls[0].at);
    assert!(span < Duration::from_secs(1), "no wait on the rate window: {span:?}");
}
