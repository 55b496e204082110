//! String tests.

use filterforge_core::{StringComparison, Value};

use super::compare::fold;
use crate::expr::TextOp;

/// Applies a string test.
///
/// `Equals` follows lifted equality, so two nulls are equal. The substring tests
/// fail when either side is null.
pub fn text_matches(op: TextOp, value: &Value, pattern: &Value, comparison: StringComparison) -> bool {
    let (value, pattern) = match (value.as_str(), pattern.as_str()) {
        (Some(v), Some(p)) => (fold(v, comparison), fold(p, comparison)),
        _ => return op == TextOp::Equals && value.is_null() && pattern.is_null(),
    };
    match op {
        TextOp::Equals => value == pattern,
        TextOp::Contains => value.contains(pattern.as_ref()),
        TextOp::StartsWith => value.starts_with(pattern.as_ref()),
        TextOp::EndsWith => value.ends_with(pattern.as_ref()),
    }
}

/// Returns true if `collection` holds a string equal to `item`.
pub fn text_in(collection: &Value, item: &Value, comparison: StringComparison) -> bool {
    let Some(items) = collection.as_list() else {
        return false;
    };
    match item.as_str() {
        Some(item) => {
            let item = fold(item, comparison);
            items
                .iter()
                .filter_map(Value::as_str)
                .any(|candidate| fold(candidate, comparison) == item)
        }
        None => item.is_null() && items.iter().any(Value::is_null),
    }
}
