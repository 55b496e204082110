//! Type compatibility resolution.
//!
//! Pure functions deciding whether an (entity type, filter type, operator) triple
//! is legal and which implicit numeric widening each side needs.
//!
//! # Widening table
//!
//! | left | right | common type |
//! |------|-------|-------------|
//! | integer | integer, same signedness | the wider one |
//! | signed `S` | unsigned `U` | `S` if strictly wider, else the next signed type wider than `U` |
//! | `u64` | any signed | incompatible |
//! | integer | `f32` / `f64` / `decimal` | the non-integer side |
//! | `f32` | `f64` | `f64` |
//! | `decimal` | `f32` / `f64` | incompatible |
//!
//! Pairs not listed are incompatible.


use std::fmt;

use thiserror::Error;

use crate::operator::{CompareOp, StringOp};
use crate::types::{NumericType, ValueType};

/// Relation a type is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Equality,
    Ordering,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Equality => f.write_str("equality"),
            Relation::Ordering => f.write_str("ordering"),
        }
    }
}

/// Why two types cannot be bound.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Incompatibility {
    #[error("type {type_name} defines no {relation} operator")]
    MissingRelation {
        type_name: String,
        relation: Relation,
    },

    #[error("no common representation")]
    NoCommonType,

    #[error("item type {item} is wider than element type {element}")]
    WiderItem {
        element: NumericType,
        item: NumericType,
    },

    #[error("not a string")]
    NotAString,
}

/// Conversions each side of a comparison needs before the operator applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionPlan {
    /// Target type for the entity side, if it needs widening.
    pub entity: Option<NumericType>,
    /// Target type for the filter side, if it needs widening.
    pub filter: Option<NumericType>,
    pub entity_nullable: bool,
    pub filter_nullable: bool,
}

/// Minimal common representation of two numeric types.
pub fn common_numeric(a: NumericType, b: NumericType) -> Option<NumericType> {
    use NumericType::{Decimal, F32, F64};

    if a == b {
        return Some(a);
    }
    match (a, b) {
        (F32, F64) | (F64, F32) => Some(F64),
        (Decimal, F32 | F64) | (F32 | F64, Decimal) => None,
        (x, y) if x.is_integer() && !y.is_integer() => Some(y),
        (x, y) if !x.is_integer() && y.is_integer() => Some(x),
        (x, y) if x.is_signed() == y.is_signed() => {
            Some(if x.bits() >= y.bits() { x } else { y })
        }
        (x, y) => {
            let (signed, unsigned) = if x.is_signed() { (x, y) } else { (y, x) };
            if signed.bits() > unsigned.bits() {
                Some(signed)
            } else {
                NumericType::signed_wider_than(unsigned.bits())
            }
        }
    }
}

/// Resolves a Compare binding.
pub fn resolve_comparison(
    entity: &ValueType,
    filter: &ValueType,
    op: CompareOp,
) -> Result<ConversionPlan, Incompatibility> {
    let (entity_type, entity_nullable) = entity.underlying();
    let (filter_type, filter_nullable) = filter.underlying();
    let mut plan = ConversionPlan {
        entity_nullable,
        filter_nullable,
        ..ConversionPlan::default()
    };

    if entity_type == filter_type {
        let comparability = entity_type.comparability();
        if !comparability.has_equality() {
            return Err(Incompatibility::MissingRelation {
                type_name: entity_type.to_string(),
                relation: Relation::Equality,
            });
        }
        if op.is_ordering() && !comparability.has_ordering() {
            return Err(Incompatibility::MissingRelation {
                type_name: entity_type.to_string(),
                relation: Relation::Ordering,
            });
        }
        return Ok(plan);
    }

    let (Some(a), Some(b)) = (entity_type.as_numeric(), filter_type.as_numeric()) else {
        return Err(Incompatibility::NoCommonType);
    };
    let common = common_numeric(a, b).ok_or(Incompatibility::NoCommonType)?;
    plan.entity = (a != common).then_some(common);
    plan.filter = (b != common).then_some(common);
    Ok(plan)
}

/// Resolves a containment relation between a collection's element type and an item type.
///
/// Returns the conversion the item needs to match the element type. The element side
/// is never converted: it must be at least as wide as the item.
pub fn resolve_containment(
    element: &ValueType,
    item: &ValueType,
) -> Result<Option<NumericType>, Incompatibility> {
    let (element_type, _) = element.underlying();
    let (item_type, _) = item.underlying();

    if element_type == item_type {
        if !element_type.comparability().has_equality() {
            return Err(Incompatibility::MissingRelation {
                type_name: element_type.to_string(),
                relation: Relation::Equality,
            });
        }
        return Ok(None);
    }

    let (Some(el), Some(it)) = (element_type.as_numeric(), item_type.as_numeric()) else {
        return Err(Incompatibility::NoCommonType);
    };
    match common_numeric(el, it) {
        Some(common) if common == el => Ok(Some(el)),
        Some(_) => Err(Incompatibility::WiderItem {
            element: el,
            item: it,
        }),
        None => Err(Incompatibility::NoCommonType),
    }
}

/// Checks a string binding: strings on both sides, or a list of strings on the
/// filter side for `In`/`NotIn`.
pub fn resolve_string(
    entity: &ValueType,
    filter: &ValueType,
    op: StringOp,
) -> Result<(), Incompatibility> {
    let legal = if op.is_membership() {
        entity.is_string() && filter.element().is_some_and(ValueType::is_string)
    } else {
        entity.is_string() && filter.is_string()
    };
    if legal {
        Ok(())
    } else {
        Err(Incompatibility::NotAString)
    }
}
