use std::time::Duration;

use futures::StreamExt;
use pagewise::PagewiseError;
use pagewise_mock::{MockPageFetcher, PageBehavior, trade_pages};

use crate::helpers::{AAPL, MSFT, as_fetcher, client, sym, trades_endpoint};

#[tokio::test(start_paused = true)]
async fn dropping_a_symbol_stream_releases_its_permit_and_stops_fetching() {
    let mock = MockPageFetcher::builder()
        .behaviors(
            "stocks/AAPL/trades",
            vec![
                PageBehavior::Items(trade_pages(AAPL, &[2]).remove(0)),
                PageBehavior::Hang,
            ],
        )
        .pages("stocks/MSFT/trades", trade_pages(MSFT, &[3, 3]))
        .build();
    let client = client();

    let mut streams =
        client.dictionary_of_lists(as_fetcher(&mock), [sym(AAPL), sym(MSFT)], trades_endpoint);
    let mut aapl = streams.remove(&sym(AAPL)).expect("AAPL key");
    aapl.next().await.expect("item").expect("ok");
    aapl.next().await.expect("item").expect("ok");
    assert_eq!(mock.calls_for("stocks/AAPL/trades").len(), 1);

    let stuck = tokio::time::timeout(Duration::from_millis(10), aapl.next()).await;
    assert!(stuck.is_err(), "second page never arrives");
    assert_eq!(mock.calls_for("stocks/AAPL/trades").len(), 2);
    assert_eq!(client.throttler().in_flight(), 1);

    drop(aapl);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(client.throttler().in_flight(), 0);
    assert_eq!(mock.in_flight(), 0);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(mock.calls_for("stocks/AAPL/trades").len(), 2, "no further fetch");

    // The other symbol is untouched.
    let mut msft = streams.remove(&sym(MSFT)).expect("MSFT key");
    assert_eq!(pagewise::util::count_items(&mut msft).await, Ok(6));
}

#[tokio::test(start_paused = true)]
async fn dropping_a_list_mid_fetch_releases_its_permit() {
    let mock = MockPageFetcher::<u32>::builder()
        .behaviors("trades", vec![PageBehavior::Items(vec![1]), PageBehavior::Hang])
        .build();
    let client = client();

    let mut items = client.list(as_fetcher(&mock), "trades");
    assert_eq!(items.next().await, Some(Ok(1)));

    let pending = tokio::time::timeout(Duration::from_millis(100), items.next()).await;
    assert!(pending.is_err(), "second page never arrives");
    // The interrupted fetch lives in the stream until the stream goes away.
    assert_eq!(client.throttler().in_flight(), 1);

    drop(items);
    assert_eq!(client.throttler().in_flight(), 0);
    assert_eq!(mock.in_flight(), 0);
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn abandoned_pull_refetches_the_same_page() {
    let mock = MockPageFetcher::<u32>::builder()
        .latency(Duration::from_millis(200))
        .pages("trades", vec![vec![1], vec![2]])
        .build();
    let client = client();

    let mut cursor = client.cursor(as_fetcher(&mock), "trades");
    assert_eq!(cursor.next_item().await, Some(Ok(1)));

    let cut = tokio::time::timeout(Duration::from_millis(50), cursor.next_item()).await;
    assert!(cut.is_err());
    assert_eq!(cursor.next_item().await, Some(Ok(2)));
    assert_eq!(cursor.next_item().await, None);

    let calls = mock.calls_for("trades");
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].token, calls[2].token, "same page requested again");
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_waiting_workers() {
    let mock = MockPageFetcher::builder()
        .pages("stocks/AAPL/trades", trade_pages(AAPL, &[1, 1, 1]))
        .build();
    let client = crate::helpers::client_with(pagewise::ThrottleParameters::new(
        1,
        1,
        Duration::from_secs(60),
    ));

    let mut streams = client.dictionary_of_lists(as_fetcher(&mock), [sym(AAPL)], trades_endpoint);
    let mut aapl = streams.remove(&sym(AAPL)).expect("AAPL key");
    aapl.next().await.expect("item").expect("ok");

    let waiting = tokio::time::timeout(Duration::from_secs(1), aapl.next()).await;
    assert!(waiting.is_err(), "rate window is full");
    client.shutdown();

    assert_eq!(aapl.next().await, Some(Err(PagewiseError::Cancelled)));
    assert_eq!(aapl.next().await, None);
    assert_eq!(mock.call_count(), 1);
}
