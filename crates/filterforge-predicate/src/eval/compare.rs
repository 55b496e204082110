//! Lifted comparison of values.
//!
//! Null is a value of every nullable type: `null == null`, `null != x`, and no
//! ordering holds when either side is null. Values of different kinds never match.

use std::borrow::Cow;
use std::cmp::Ordering;

use filterforge_core::{CompareOp, StringComparison, Value};

/// Checks if two values are equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => a
            .equals(b)
            .or_else(|| a.compare(b).map(Ordering::is_eq))
            .unwrap_or(false),
    }
}

/// Orders two non-null values.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    a.compare(b)
}

/// Applies a comparison operator.
pub fn apply(op: CompareOp, a: &Value, b: &Value) -> bool {
    match op {
        CompareOp::Equal => values_equal(a, b),
        CompareOp::NotEqual => !values_equal(a, b),
        CompareOp::GreaterThan => compare_values(a, b).is_some_and(Ordering::is_gt),
        CompareOp::GreaterOrEqual => compare_values(a, b).is_some_and(Ordering::is_ge),
        CompareOp::LessThan => compare_values(a, b).is_some_and(Ordering::is_lt),
        CompareOp::LessOrEqual => compare_values(a, b).is_some_and(Ordering::is_le),
    }
}

/// Returns true if the collection holds an element equal to `item`.
///
/// A null or non-list collection holds nothing.
pub fn list_contains(collection: &Value, item: &Value) -> bool {
    collection
        .as_list()
        .is_some_and(|items| items.iter().any(|element| values_equal(element, item)))
}

pub(crate) fn fold(s: &str, comparison: StringComparison) -> Cow<'_, str> {
    match comparison {
        StringComparison::CaseSensitive => Cow::Borrowed(s),
        StringComparison::CaseInsensitive => Cow::Owned(s.to_lowercase()),
    }
}
