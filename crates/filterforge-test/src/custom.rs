//! Caller-defined value types.
//!
//! [`Money`] defines both relations; [`Blob`] defines neither.

use std::any::Any;
use std::cmp::Ordering;

use filterforge_core::{Comparability, CustomType, CustomValue, ValueType};

/// An amount in cents. Ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Money(pub i64);

impl Money {
    pub fn value_type() -> ValueType {
        ValueType::Custom(CustomType::new("Money", Comparability::Ordered))
    }
}

impl CustomValue for Money {
    fn type_name(&self) -> &str {
        "Money"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn equals(&self, other: &dyn CustomValue) -> Option<bool> {
        other.as_any().downcast_ref::<Money>().map(|o| self == o)
    }

    fn compare(&self, other: &dyn CustomValue) -> Option<Ordering> {
        other.as_any().downcast_ref::<Money>().map(|o| self.cmp(o))
    }
}

/// Raw bytes with no equality. Reference-like, so it may be null.
#[derive(Debug, Clone)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    pub fn value_type() -> ValueType {
        ValueType::Custom(CustomType::reference("Blob", Comparability::Opaque))
    }
}

impl CustomValue for Blob {
    fn type_name(&self) -> &str {
        "Blob"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
