use std::sync::Arc;
use std::time::Duration;

use pagewise::{Client, PageFetcher, ThrottleParameters};
use pagewise_mock::{MockPageFetcher, sized_pages};
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=debug cargo run --example 00_tracing --features tracing
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    let fetcher: Arc<dyn PageFetcher<u32>> = MockPageFetcher::builder()
        .latency(Duration::from_millis(20))
        .pages("stocks/AAPL/bars", sized_pages(&[3, 3, 1]))
        .build();

    let client = Client::builder()
        .security_id("demo-key")
        .api_endpoint("https://data.example.com/v2/")
        .throttle(ThrottleParameters::new(2, 5, Duration::from_secs(1)))
        .build()?;

    let mut bars = client.list_of_lists(fetcher, "stocks/AAPL/bars");
    let total = pagewise::util::count_batch_items(&mut bars).await?;
    println!("fetched {total} bars");
    Ok(())
}
