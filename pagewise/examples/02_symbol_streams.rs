use std::sync::Arc;
use std::time::Duration;

use pagewise::{Client, PageFetcher, Symbol};
use pagewise_mock::{MockPageFetcher, MockTrade, trade_pages};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mock = MockPageFetcher::builder()
        .latency(Duration::from_millis(50))
        .pages("stocks/AAPL/trades", trade_pages("AAPL", &[4, 4, 2]))
        .pages("stocks/MSFT/trades", trade_pages("MSFT", &[5]))
        .build();
    let fetcher: Arc<dyn PageFetcher<MockTrade>> = mock.clone();

    let client = Client::builder()
        .security_id("demo-key")
        .api_endpoint("https://data.example.com/v2/")
        .max_concurrent(2)
        .max_per_interval(10)
        .interval(Duration::from_secs(1))
        .build()?;

    let symbols = [Symbol::new("AAPL")?, Symbol::new("MSFT")?];
    let mut streams =
        client.dictionary_of_lists(fetcher, symbols, |s| format!("stocks/{s}/trades"));

    let mut totals: Vec<_> = pagewise::util::count_dictionary(&mut streams)
        .await
        .into_iter()
        .collect();
    totals.sort_by(|a, b| a.0.cmp(&b.0));
    for (symbol, total) in totals {
        println!("{symbol}: {}", total?);
    }
    println!("peak concurrent requests: {}", mock.peak_in_flight());
    Ok(())
}
