//! The binding model: one configured relationship between filter and entity properties.
//!
//! Bindings are produced by the registration layer after type resolution, so every
//! binding here is legal. The compiler turns them into expression templates.

use std::fmt;
use std::sync::Arc;

use filterforge_core::{
    CompareOp, ContainOp, ConversionPlan, MembershipOp, NumericType, RangeBound, Record, Result,
    Shape, StringComparison, StringOp, ValueType,
};

use crate::expr::Expr;

/// A condition over the filter instance, evaluated when a predicate is requested.
pub type FilterCondition = Arc<dyn Fn(&Record) -> bool + Send + Sync>;

/// Decides null handling for a filter instance.
///
/// `Some(true)` admits null entity values, `Some(false)` rejects them, and `None`
/// leaves the base condition unchanged.
pub type NullInclusion = Arc<dyn Fn(&Record) -> Option<bool> + Send + Sync>;

/// Runtime rules attached to a binding.
#[derive(Clone, Default)]
pub struct BindingRules {
    pub reverse_if: Option<FilterCondition>,
    pub include_null_if: Option<NullInclusion>,
    pub ignore_if: Option<FilterCondition>,
    /// Conditions from conditional filter exclusions. Any true condition ignores the binding.
    pub exclusions: Vec<FilterCondition>,
}

impl BindingRules {
    /// Returns true if no explicit ignore or null rule is configured, so the
    /// default "ignore when the filter value is null" applies.
    pub fn uses_default_ignore(&self) -> bool {
        self.ignore_if.is_none() && self.include_null_if.is_none()
    }
}

impl fmt::Debug for BindingRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingRules")
            .field("reverse_if", &self.reverse_if.is_some())
            .field("include_null_if", &self.include_null_if.is_some())
            .field("ignore_if", &self.ignore_if.is_some())
            .field("exclusions", &self.exclusions.len())
            .finish()
    }
}

/// A resolved property of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    pub name: Arc<str>,
    pub index: usize,
    pub value_type: ValueType,
}

impl PropertyRef {
    /// Looks up `name` in `shape`.
    pub fn resolve(shape: &Shape, name: &str) -> Result<Self> {
        let (index, field) = shape.require(name)?;
        Ok(Self {
            name: field.name.clone(),
            index,
            value_type: field.value_type.clone(),
        })
    }

    pub fn can_be_null(&self) -> bool {
        self.value_type.can_be_null()
    }
}

/// Identity of a binding for duplicate detection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindingKey {
    /// Compare, Contain, In and string bindings.
    Pair { entity: Arc<str>, filter: Arc<str> },
    FilterRange {
        min: Arc<str>,
        entity: Arc<str>,
        max: Arc<str>,
    },
    EntityRange {
        min: Arc<str>,
        filter: Arc<str>,
        max: Arc<str>,
    },
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKey::Pair { entity, filter } => write!(f, "{entity} <- filter.{filter}"),
            BindingKey::FilterRange { min, entity, max } => {
                write!(f, "filter.{min} .. {entity} .. filter.{max}")
            }
            BindingKey::EntityRange { min, filter, max } => {
                write!(f, "{min} .. filter.{filter} .. {max}")
            }
        }
    }
}

/// One side of a range binding.
#[derive(Debug, Clone)]
pub struct RangeSide {
    /// The property holding the bound.
    pub bound: PropertyRef,
    pub kind: RangeBound,
    pub plan: ConversionPlan,
}

/// A configured relationship.
#[derive(Debug, Clone)]
pub enum Binding {
    /// `entity <op> filter`.
    Compare {
        entity: PropertyRef,
        filter: PropertyRef,
        op: CompareOp,
        plan: ConversionPlan,
        rules: BindingRules,
    },
    /// The entity's collection holds the filter's value, converted to the element type.
    Contain {
        entity: PropertyRef,
        filter: PropertyRef,
        op: ContainOp,
        convert: Option<NumericType>,
        /// Case handling when the elements are strings.
        comparison: Option<StringComparison>,
        rules: BindingRules,
    },
    /// The entity's value, converted to the element type, is in the filter's collection.
    In {
        entity: PropertyRef,
        filter: PropertyRef,
        op: MembershipOp,
        convert: Option<NumericType>,
        comparison: Option<StringComparison>,
        rules: BindingRules,
    },
    /// A string test between two string properties, or string membership.
    Text {
        entity: PropertyRef,
        filter: PropertyRef,
        op: StringOp,
        comparison: StringComparison,
        rules: BindingRules,
    },
    /// `filter.min <= entity <= filter.max`, each side with its own bound kind.
    FilterRange {
        entity: PropertyRef,
        min: RangeSide,
        max: RangeSide,
        rules: BindingRules,
    },
    /// `entity.min <= filter <= entity.max`.
    EntityRange {
        filter: PropertyRef,
        min: RangeSide,
        max: RangeSide,
        rules: BindingRules,
    },
    /// A caller-supplied fragment, inserted as is. Only conditional exclusions
    /// from `rules` apply to it.
    Raw {
        label: String,
        expr: Expr,
        rules: BindingRules,
    },
}

impl Binding {
    /// Duplicate-detection key; raw bindings have none.
    pub fn key(&self) -> Option<BindingKey> {
        match self {
            Binding::Compare { entity, filter, .. }
            | Binding::Contain { entity, filter, .. }
            | Binding::In { entity, filter, .. }
            | Binding::Text { entity, filter, .. } => Some(BindingKey::Pair {
                entity: entity.name.clone(),
                filter: filter.name.clone(),
            }),
            Binding::FilterRange {
                entity, min, max, ..
            } => Some(BindingKey::FilterRange {
                min: min.bound.name.clone(),
                entity: entity.name.clone(),
                max: max.bound.name.clone(),
            }),
            Binding::EntityRange {
                filter, min, max, ..
            } => Some(BindingKey::EntityRange {
                min: min.bound.name.clone(),
                filter: filter.name.clone(),
                max: max.bound.name.clone(),
            }),
            Binding::Raw { .. } => None,
        }
    }

    /// Short human-readable description, used in logs.
    pub fn label(&self) -> String {
        match self {
            Binding::Compare {
                entity, filter, op, ..
            } => format!("{} {op} filter.{}", entity.name, filter.name),
            Binding::Contain {
                entity, filter, op, ..
            } => format!("{} {op} filter.{}", entity.name, filter.name),
            Binding::In {
                entity, filter, op, ..
            } => format!("{} {op} filter.{}", entity.name, filter.name),
            Binding::Text {
                entity, filter, op, ..
            } => format!("{} {op} filter.{}", entity.name, filter.name),
            Binding::Raw { label, .. } => format!("raw {label}"),
            ranged => match ranged.key() {
                Some(key) => key.to_string(),
                None => String::new(),
            },
        }
    }

    pub fn rules(&self) -> &BindingRules {
        match self {
            Binding::Compare { rules, .. }
            | Binding::Contain { rules, .. }
            | Binding::In { rules, .. }
            | Binding::Text { rules, .. }
            | Binding::FilterRange { rules, .. }
            | Binding::EntityRange { rules, .. }
            | Binding::Raw { rules, .. } => rules,
        }
    }

    pub fn rules_mut(&mut self) -> &mut BindingRules {
        match self {
            Binding::Compare { rules, .. }
            | Binding::Contain { rules, .. }
            | Binding::In { rules, .. }
            | Binding::Text { rules, .. }
            | Binding::FilterRange { rules, .. }
            | Binding::EntityRange { rules, .. }
            | Binding::Raw { rules, .. } => rules,
        }
    }

    /// Entity and filter field indices the binding reads.
    pub fn fields(&self) -> (Vec<usize>, Vec<usize>) {
        match self {
            Binding::Compare { entity, filter, .. }
            | Binding::Contain { entity, filter, .. }
            | Binding::In { entity, filter, .. }
            | Binding::Text { entity, filter, .. } => (vec![entity.index], vec![filter.index]),
            Binding::FilterRange {
                entity, min, max, ..
            } => (vec![entity.index], vec![min.bound.index, max.bound.index]),
            Binding::EntityRange {
                filter, min, max, ..
            } => (vec![min.bound.index, max.bound.index], vec![filter.index]),
            Binding::Raw { expr, .. } => {
                let (mut entity, mut filter) = (Vec::new(), Vec::new());
                expr.collect_fields(&mut entity, &mut filter);
                (entity, filter)
            }
        }
    }
}
