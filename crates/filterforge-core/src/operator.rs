//! Operators a binding can apply, and their reversal tables.
//!
//! Every `inverse` is an involution: applying it twice yields the original operator.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar comparison between an entity value and a filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum CompareOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl CompareOp {
    /// Logical inverse: `Equal↔NotEqual`, `GreaterThan↔LessOrEqual`, `GreaterOrEqual↔LessThan`.
    pub fn inverse(self) -> CompareOp {
        match self {
            CompareOp::Equal => CompareOp::NotEqual,
            CompareOp::NotEqual => CompareOp::Equal,
            CompareOp::GreaterThan => CompareOp::LessOrEqual,
            CompareOp::LessOrEqual => CompareOp::GreaterThan,
            CompareOp::GreaterOrEqual => CompareOp::LessThan,
            CompareOp::LessThan => CompareOp::GreaterOrEqual,
        }
    }

    /// Returns true for operators that need an ordering relation.
    pub fn is_ordering(self) -> bool {
        !matches!(self, CompareOp::Equal | CompareOp::NotEqual)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterOrEqual => ">=",
            CompareOp::LessThan => "<",
            CompareOp::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// "Does the entity's collection contain the filter's value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContainOp {
    Contains,
    NotContains,
}

impl ContainOp {
    pub fn inverse(self) -> ContainOp {
        match self {
            ContainOp::Contains => ContainOp::NotContains,
            ContainOp::NotContains => ContainOp::Contains,
        }
    }

    pub fn is_negated(self) -> bool {
        self == ContainOp::NotContains
    }
}

impl fmt::Display for ContainOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainOp::Contains => f.write_str("contains"),
            ContainOp::NotContains => f.write_str("not contains"),
        }
    }
}

/// "Is the entity's value present in the filter's collection".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MembershipOp {
    In,
    NotIn,
}

impl MembershipOp {
    pub fn inverse(self) -> MembershipOp {
        match self {
            MembershipOp::In => MembershipOp::NotIn,
            MembershipOp::NotIn => MembershipOp::In,
        }
    }

    pub fn is_negated(self) -> bool {
        self == MembershipOp::NotIn
    }
}

impl fmt::Display for MembershipOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MembershipOp::In => f.write_str("in"),
            MembershipOp::NotIn => f.write_str("not in"),
        }
    }
}

/// Operators of string bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StringOp {
    #[default]
    Equal,
    NotEqual,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
    In,
    NotIn,
}

impl StringOp {
    pub fn inverse(self) -> StringOp {
        match self {
            StringOp::Equal => StringOp::NotEqual,
            StringOp::NotEqual => StringOp::Equal,
            StringOp::Contains => StringOp::NotContains,
            StringOp::NotContains => StringOp::Contains,
            StringOp::StartsWith => StringOp::NotStartsWith,
            StringOp::NotStartsWith => StringOp::StartsWith,
            StringOp::EndsWith => StringOp::NotEndsWith,
            StringOp::NotEndsWith => StringOp::EndsWith,
            StringOp::In => StringOp::NotIn,
            StringOp::NotIn => StringOp::In,
        }
    }

    pub fn is_negated(self) -> bool {
        matches!(
            self,
            StringOp::NotEqual
                | StringOp::NotContains
                | StringOp::NotStartsWith
                | StringOp::NotEndsWith
                | StringOp::NotIn
        )
    }

    /// Returns true for `In`/`NotIn`, whose filter side is a list of strings.
    pub fn is_membership(self) -> bool {
        matches!(self, StringOp::In | StringOp::NotIn)
    }

    pub fn name(self) -> &'static str {
        match self {
            StringOp::Equal => "equal",
            StringOp::NotEqual => "not_equal",
            StringOp::Contains => "contains",
            StringOp::NotContains => "not_contains",
            StringOp::StartsWith => "starts_with",
            StringOp::NotStartsWith => "not_starts_with",
            StringOp::EndsWith => "ends_with",
            StringOp::NotEndsWith => "not_ends_with",
            StringOp::In => "in",
            StringOp::NotIn => "not_in",
        }
    }
}

impl fmt::Display for StringOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Case handling of string bindings, carried unchanged into the compiled predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StringComparison {
    /// Ordinal comparison.
    #[default]
    CaseSensitive,
    /// Both sides folded to lowercase before comparing.
    CaseInsensitive,
}

/// Whether a range bound admits equality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RangeBound {
    #[default]
    Inclusive,
    Exclusive,
}

impl RangeBound {
    /// Operator of `bound ? value` for the lower side, written as `value ? bound`.
    pub fn lower_op(self) -> CompareOp {
        match self {
            RangeBound::Inclusive => CompareOp::GreaterOrEqual,
            RangeBound::Exclusive => CompareOp::GreaterThan,
        }
    }

    /// Operator of `value ? bound` for the upper side.
    pub fn upper_op(self) -> CompareOp {
        match self {
            RangeBound::Inclusive => CompareOp::LessOrEqual,
            RangeBound::Exclusive => CompareOp::LessThan,
        }
    }
}
