use pagewise::util::{count_batch_items, count_dictionary, count_items};
use pagewise_mock::{MockPageFetcher, sized_pages};
use proptest::prelude::*;

use crate::helpers::{as_fetcher, client, sym, trades_endpoint};

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn totals_match_page_sizes(sizes in prop::collection::vec(0usize..12, 1..8)) {
        let expected: usize = sizes.iter().sum();
        let (flat, batched, calls) = tokio_test::block_on(async {
            let mock = MockPageFetcher::builder()
                .pages("bars", sized_pages(&sizes))
                .build();
            let client = client();
            let flat = count_items(&mut client.list(as_fetcher(&mock), "bars")).await;
            let batched =
                count_batch_items(&mut client.list_of_lists(as_fetcher(&mock), "bars")).await;
            (flat, batched, mock.call_count())
        });
        prop_assert_eq!(flat, Ok(expected));
        prop_assert_eq!(batched, Ok(expected));
        prop_assert_eq!(calls, 2 * sizes.len());
    }

    #[test]
    fn dictionary_totals_are_independent_per_symbol(
        a in prop::collection::vec(0usize..6, 1..5),
        b in prop::collection::vec(0usize..6, 1..5),
    ) {
        let totals = tokio_test::block_on(async {
            let (sa, sb) = (sym("A"), sym("B"));
            let mock = MockPageFetcher::builder()
                .pages(trades_endpoint(&sa), sized_pages(&a))
                .pages(trades_endpoint(&sb), sized_pages(&b))
                .build();
            let mut streams =
                client().dictionary_of_lists(as_fetcher(&mock), [sa, sb], trades_endpoint);
            count_dictionary(&mut streams).await
        });
        prop_assert_eq!(totals.len(), 2);
        prop_assert_eq!(totals[&sym("A")].clone(), Ok(a.iter().sum::<usize>()));
        prop_assert_eq!(totals[&sym("B")].clone(), Ok(b.iter().sum::<usize>()));
    }
}
