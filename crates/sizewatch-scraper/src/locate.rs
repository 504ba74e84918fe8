//! Schema-less search for the size options list inside a state blob.
//!
//! Storefronts move the size list around between releases, so instead of a
//! fixed path the blob is searched for a structural fingerprint: a non-empty
//! array whose first element is an object carrying [`DISPLAY_SIZE_KEY`].
//!
//! Any unrelated list whose first element happens to carry the same key is
//! accepted too; nothing in the page identifies which product a list belongs
//! to.

use serde_json::Value;

/// Key whose presence marks an object as a size record.
pub const DISPLAY_SIZE_KEY: &str = "scDisplaySize";

/// Depth-first search for the first array accepted by `qualifies`.
///
/// Arrays are tested before their elements are visited; elements are visited
/// in order and object values in key order. Scalars never match.
pub fn find_sequence<'a, P>(node: &'a Value, qualifies: &P) -> Option<&'a [Value]>
where
    P: Fn(&[Value]) -> bool,
{
    match node {
        Value::Array(items) => {
            if qualifies(items) {
                return Some(items);
            }
            items.iter().find_map(|item| find_sequence(item, qualifies))
        }
        Value::Object(map) => map.values().find_map(|value| find_sequence(value, qualifies)),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

fn looks_like_size_options(items: &[Value]) -> bool {
    items
        .first()
        .and_then(Value::as_object)
        .is_some_and(|first| first.contains_key(DISPLAY_SIZE_KEY))
}

/// Find the first list in `blob` that looks like a size options list.
#[must_use]
pub fn find_size_options(blob: &Value) -> Option<&[Value]> {
    find_sequence(blob, &looks_like_size_options)
}
