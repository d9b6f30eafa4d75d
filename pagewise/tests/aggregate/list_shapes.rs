use futures::StreamExt;
use pagewise::util::{count_batch_items, count_grouped, count_items};
use pagewise::{CursorState, PagewiseError};
use pagewise_mock::{MockPageFetcher, MockTrade, PageBehavior, sized_pages, trade_pages};

use crate::helpers::{AAPL, MSFT, as_fetcher, client, sym};

#[tokio::test]
async fn flat_list_yields_every_item_and_stops_after_last_page() {
    let mock = MockPageFetcher::builder()
        .pages("trades", sized_pages(&[10, 10, 10, 10, 7]))
        .build();
    let client = client();

    let mut items = client.list(as_fetcher(&mock), "trades");
    assert_eq!(count_items(&mut items).await, Ok(47));
    assert_eq!(mock.call_count(), 5, "no sixth fetch");

    // Draining again yields nothing and fetches nothing.
    assert_eq!(count_items(&mut items).await, Ok(0));
    assert_eq!(mock.call_count(), 5);
}

#[tokio::test]
async fn flat_list_preserves_page_then_item_order() {
    let mock = MockPageFetcher::builder()
        .pages("trades", sized_pages(&[3, 0, 2]))
        .build();
    let items: Vec<u32> = client()
        .list(as_fetcher(&mock), "trades")
        .map(|r| r.expect("no errors"))
        .collect()
        .await;
    assert_eq!(items, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn nothing_is_fetched_until_pulled() {
    let mock = MockPageFetcher::builder()
        .pages("trades", sized_pages(&[2, 2]))
        .build();
    let client = client();

    let mut items = client.list(as_fetcher(&mock), "trades");
    tokio::task::yield_now().await;
    assert_eq!(mock.call_count(), 0);

    items.next().await.expect("first item").expect("ok");
    assert_eq!(mock.call_count(), 1);
    items.next().await.expect("second item").expect("ok");
    assert_eq!(mock.call_count(), 1, "second item comes from the held page");
    items.next().await.expect("third item").expect("ok");
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn list_of_lists_keeps_page_boundaries_including_empty_pages() {
    let mock = MockPageFetcher::builder()
        .pages("bars", sized_pages(&[4, 0, 4, 2]))
        .build();

    let mut pages = client().list_of_lists(as_fetcher(&mock), "bars");
    let mut sizes = Vec::new();
    while let Some(batch) = pages.next().await {
        sizes.push(batch.expect("no errors").len());
    }
    assert_eq!(sizes, vec![4, 0, 4, 2]);
    assert_eq!(mock.call_count(), 4);
}

#[tokio::test]
async fn batch_total_is_the_sum_of_unit_sizes() {
    let mock = MockPageFetcher::builder()
        .pages("bars", sized_pages(&[5, 5, 1]))
        .build();
    let mut pages = client().list_of_lists(as_fetcher(&mock), "bars");
    assert_eq!(count_batch_items(&mut pages).await, Ok(11));
}

#[tokio::test]
async fn stream_yields_the_error_once_then_ends() {
    let mock = MockPageFetcher::builder()
        .behaviors(
            "trades",
            vec![
                PageBehavior::Items(vec![1u32, 2]),
                PageBehavior::Fail(PagewiseError::server(502, "bad gateway")),
                PageBehavior::Items(vec![3]),
            ],
        )
        .build();

    let results: Vec<_> = client().list(as_fetcher(&mock), "trades").collect().await;
    assert_eq!(results.len(), 3);
    assert_eq!(results[0], Ok(1));
    assert_eq!(results[1], Ok(2));
    assert_eq!(results[2], Err(PagewiseError::server(502, "bad gateway")));
    assert_eq!(mock.call_count(), 2, "no retry after failure");
}

#[tokio::test]
async fn cursor_keeps_reraising_the_terminal_error() {
    let mock = MockPageFetcher::<u32>::builder()
        .behaviors(
            "trades",
            vec![PageBehavior::Fail(PagewiseError::transport("reset"))],
        )
        .build();

    let mut cursor = client().cursor(as_fetcher(&mock), "trades");
    for _ in 0..3 {
        let err = cursor.next_item().await.expect("error item").expect_err("failed");
        assert_eq!(err, PagewiseError::transport("reset"));
    }
    assert_eq!(cursor.state(), CursorState::Failed);
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn grouped_pages_split_each_page_by_symbol() {
    let mut pages = trade_pages(AAPL, &[2, 1]);
    let msft = trade_pages(MSFT, &[1, 2]);
    for (page, extra) in pages.iter_mut().zip(msft) {
        page.extend(extra);
    }
    // A page with no MSFT trades at all.
    pages.push(trade_pages(AAPL, &[3]).remove(0));

    let mock = MockPageFetcher::builder().pages("trades", pages).build();
    let client = client();

    let groups: Vec<_> = client
        .list_of_dictionaries_of_lists(as_fetcher(&mock), "trades", |t: &MockTrade| {
            t.symbol.clone()
        })
        .map(|r| r.expect("no errors"))
        .collect()
        .await;

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0][&sym(AAPL)].len(), 2);
    assert_eq!(groups[0][&sym(MSFT)].len(), 1);
    assert_eq!(groups[1][&sym(MSFT)].len(), 2);
    assert!(!groups[2].contains_key(&sym(MSFT)));
    assert!(groups[1][&sym(MSFT)].windows(2).all(|w| w[0].seq < w[1].seq));

    let mut again = client.list_of_dictionaries_of_lists(
        as_fetcher(&mock),
        "trades",
        |t: &MockTrade| t.symbol.clone(),
    );
    let totals = count_grouped(&mut again).await.expect("no errors");
    assert_eq!(totals[&sym(AAPL)], 6);
    assert_eq!(totals[&sym(MSFT)], 3);
}
