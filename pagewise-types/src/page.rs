use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::PagewiseError;

/// Opaque continuation token returned by a paginated endpoint.
///
/// The value is passed back verbatim when requesting the next page and is
/// never parsed. It is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wrap a raw token value. Returns `None` for an empty string.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() { None } else { Some(Self(raw)) }
    }

    /// Borrow the raw token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContinuationToken {
    type Error = PagewiseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| PagewiseError::Other("continuation token is empty".into()))
    }
}

impl From<ContinuationToken> for String {
    fn from(value: ContinuationToken) -> Self {
        value.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of results.
///
/// `next` is present when more pages follow and absent on the last page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in server order; may be empty.
    pub items: Vec<T>,
    /// Token for the following page, if any. An empty string reads as none.
    #[serde(default, deserialize_with = "empty_token_is_none")]
    pub next: Option<ContinuationToken>,
}

fn empty_token_is_none<'de, D>(de: D) -> Result<Option<ContinuationToken>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(de)?.and_then(ContinuationToken::new))
}

impl<T> Page<T> {
    /// Build a page from items and a raw next-page token.
    ///
    /// An empty token string is treated as "no more pages".
    pub fn new(items: Vec<T>, next: Option<impl Into<String>>) -> Self {
        Self {
            items,
            next: next.and_then(ContinuationToken::new),
        }
    }

    /// Build the final page of a sequence.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }

    /// Returns `true` if this is the final page.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.next.is_none()
    }

    /// Number of items carried by this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the page carries no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
