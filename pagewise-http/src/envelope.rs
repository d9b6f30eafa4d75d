use serde::de::DeserializeOwned;
use serde_json::Value;

use pagewise_core::{Page, PagewiseError};

/// Decode a JSON page envelope.
///
/// A missing items field is an error; a missing, `null` or empty token field
/// means this is the last page.
pub(crate) fn decode_page<T: DeserializeOwned>(
    body: &[u8],
    items_field: &str,
    next_field: &str,
) -> Result<Page<T>, PagewiseError> {
    let mut root: Value = serde_json::from_slice(body)
        .map_err(|e| PagewiseError::malformed(format!("invalid JSON: {e}")))?;
    let Some(obj) = root.as_object_mut() else {
        return Err(PagewiseError::malformed("page is not a JSON object"));
    };

    let items = match obj.remove(items_field) {
        Some(Value::Null) => Vec::new(),
        Some(v @ Value::Array(_)) => serde_json::from_value(v)
            .map_err(|e| PagewiseError::malformed(format!("{items_field}: {e}")))?,
        Some(_) => {
            return Err(PagewiseError::malformed(format!(
                "{items_field} is not an array"
            )));
        }
        None => {
            return Err(PagewiseError::malformed(format!(
                "missing field {items_field}"
            )));
        }
    };

    let next = match obj.remove(next_field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            return Err(PagewiseError::malformed(format!(
                "{next_field} is not a string"
            )));
        }
    };

    Ok(Page::new(items, next))
}
