use pagewise_core::Symbol;

/// Minimal trade-like record used by fixtures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTrade {
    /// Symbol the trade belongs to.
    pub symbol: Symbol,
    /// Position of the trade within its symbol's sequence, starting at 0.
    pub seq: usize,
}

/// Pages of consecutive integers with the given sizes.
///
/// `sized_pages(&[2, 1])` yields `[[0, 1], [2]]`.
#[must_use]
pub fn sized_pages(sizes: &[usize]) -> Vec<Vec<u32>> {
    let mut next = 0u32;
    sizes
        .iter()
        .map(|&n| {
            (0..n)
                .map(|_| {
                    let v = next;
                    next += 1;
                    v
                })
                .collect()
        })
        .collect()
}

/// Pages of trades for one symbol with the given sizes.
///
/// # Panics
/// Panics if `symbol` is not a valid symbol.
#[must_use]
pub fn trade_pages(symbol: &str, sizes: &[usize]) -> Vec<Vec<MockTrade>> {
    let symbol = Symbol::new(symbol).expect("fixture symbol");
    let mut seq = 0usize;
    sizes
        .iter()
        .map(|&n| {
            (0..n)
                .map(|_| {
                    let t = MockTrade {
                        symbol: symbol.clone(),
                        seq,
                    };
                    seq += 1;
                    t
                })
                .collect()
        })
        .collect()
}
