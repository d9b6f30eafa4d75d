use std::sync::Arc;

use futures::StreamExt;
use pagewise::{Client, PageFetcher};
use pagewise_mock::{MockPageFetcher, sized_pages};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mock = MockPageFetcher::builder()
        .pages("stocks/AAPL/trades", sized_pages(&[10, 10, 10, 10, 7]))
        .build();
    let fetcher: Arc<dyn PageFetcher<u32>> = mock.clone();

    let client = Client::builder()
        .security_id("demo-key")
        .api_endpoint("https://data.example.com/v2/")
        .default_throttle()
        .build()?;

    let mut trades = client.list(fetcher, "stocks/AAPL/trades");
    let mut n = 0usize;
    while let Some(trade) = trades.next().await {
        let _trade = trade?;
        n += 1;
    }
    println!("{n} trades over {} requests", mock.call_count());
    Ok(())
}
