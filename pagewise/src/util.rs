//! Drain helpers computing derived totals over aggregate results.
//!
//! Each helper drains its input exactly once. Draining takes the stream by
//! mutable reference, so draining it again afterwards yields zero.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use futures::{Stream, StreamExt};
use pagewise_types::{PagewiseError, Symbol};

/// Count the items of a flat sequence.
///
/// # Errors
/// Returns the first error the sequence yields.
pub async fn count_items<S, T>(stream: &mut S) -> Result<usize, PagewiseError>
where
    S: Stream<Item = Result<T, PagewiseError>> + Unpin,
{
    let mut n = 0usize;
    while let Some(item) = stream.next().await {
        item?;
        n += 1;
    }
    Ok(n)
}

/// Sum the batch sizes of a page-batched sequence.
///
/// # Errors
/// Returns the first error the sequence yields.
pub async fn count_batch_items<S, T>(stream: &mut S) -> Result<usize, PagewiseError>
where
    S: Stream<Item = Result<Vec<T>, PagewiseError>> + Unpin,
{
    let mut n = 0usize;
    while let Some(batch) = stream.next().await {
        n += batch?.len();
    }
    Ok(n)
}

/// Sum, per symbol, the items of a sequence of grouped pages.
///
/// # Errors
/// Returns the first error the sequence yields.
pub async fn count_grouped<S, T>(stream: &mut S) -> Result<BTreeMap<Symbol, usize>, PagewiseError>
where
    S: Stream<Item = Result<BTreeMap<Symbol, Vec<T>>, PagewiseError>> + Unpin,
{
    let mut totals: BTreeMap<Symbol, usize> = BTreeMap::new();
    while let Some(groups) = stream.next().await {
        for (symbol, items) in groups? {
            *totals.entry(symbol).or_default() += items.len();
        }
    }
    Ok(totals)
}

/// Drain every symbol's item stream concurrently and count its items.
///
/// A failing symbol reports its own error without affecting the others.
pub async fn count_dictionary<S, T, H>(
    streams: &mut HashMap<Symbol, S, H>,
) -> HashMap<Symbol, Result<usize, PagewiseError>>
where
    S: Stream<Item = Result<T, PagewiseError>> + Unpin,
    H: BuildHasher,
{
    let tasks = streams.iter_mut().map(|(symbol, stream)| async move {
        (symbol.clone(), count_items(stream).await)
    });
    futures::future::join_all(tasks).await.into_iter().collect()
}

/// Drain every symbol's batch stream concurrently and sum its batch sizes.
///
/// A failing symbol reports its own error without affecting the others.
pub async fn count_dictionary_batches<S, T, H>(
    streams: &mut HashMap<Symbol, S, H>,
) -> HashMap<Symbol, Result<usize, PagewiseError>>
where
    S: Stream<Item = Result<Vec<T>, PagewiseError>> + Unpin,
    H: BuildHasher,
{
    let tasks = streams.iter_mut().map(|(symbol, stream)| async move {
        (symbol.clone(), count_batch_items(stream).await)
    });
    futures::future::join_all(tasks).await.into_iter().collect()
}
