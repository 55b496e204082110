//! Binding declarations.
//!
//! A declaration names properties and an operator. [`Declaration::resolve`] looks the
//! properties up, consults the type compatibility resolver and produces a [`Binding`],
//! or the configuration error explaining why the combination is illegal.
//!
//! ```
//! use filterforge_core::CompareOp;
//! use filterforge_registry::declare::Compare;
//!
//! let since = Compare::new("Year", "Since")
//!     .op(CompareOp::GreaterOrEqual)
//!     .reverse_if(|filter| filter.field("Before").and_then(|v| v.as_bool()) == Some(true));
//! ```

use std::sync::Arc;

use filterforge_config::FilterSettings;
use filterforge_core::resolve::{resolve_comparison, resolve_containment, resolve_string};
use filterforge_core::{
    CompareOp, ContainOp, ConversionPlan, FilterError, MembershipOp, NumericType, RangeBound,
    Record, Result, Shape, StringComparison, StringOp, ValueType,
};
use filterforge_predicate::{Binding, BindingRules, Expr, PropertyRef, RangeSide};

/// Something that resolves into a [`Binding`] against a shape pair.
pub trait Declaration {
    fn resolve(self, entity: &Shape, filter: &Shape, settings: &FilterSettings) -> Result<Binding>;
}

macro_rules! rule_setters {
    ($($decl:ident),* $(,)?) => {
        $(
            impl $decl {
                /// Flips the operator for filter instances where `condition` holds.
                pub fn reverse_if<F>(mut self, condition: F) -> Self
                where
                    F: Fn(&Record) -> bool + Send + Sync + 'static,
                {
                    self.rules.reverse_if = Some(Arc::new(condition));
                    self
                }

                /// Special-cases null entity values: `Some(true)` admits them,
                /// `Some(false)` rejects them, `None` leaves the base condition alone.
                pub fn include_null_if<F>(mut self, decision: F) -> Self
                where
                    F: Fn(&Record) -> Option<bool> + Send + Sync + 'static,
                {
                    self.rules.include_null_if = Some(Arc::new(decision));
                    self
                }

                /// Admits or rejects null entity values for every filter instance.
                pub fn include_nulls(self, include: bool) -> Self {
                    self.include_null_if(move |_| Some(include))
                }

                /// Drops the binding for filter instances where `condition` holds.
                ///
                /// Replaces the default "ignore when the filter value is null".
                pub fn ignore_if<F>(mut self, condition: F) -> Self
                where
                    F: Fn(&Record) -> bool + Send + Sync + 'static,
                {
                    self.rules.ignore_if = Some(Arc::new(condition));
                    self
                }
            }
        )*
    };
}

rule_setters!(Compare, Contain, In, Text, FilterRange, EntityRange);

/// `entity <op> filter`, `Equal` unless set.
#[derive(Debug, Clone)]
pub struct Compare {
    entity: String,
    filter: String,
    op: CompareOp,
    rules: BindingRules,
}

impl Compare {
    pub fn new(entity: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filter: filter.into(),
            op: CompareOp::Equal,
            rules: BindingRules::default(),
        }
    }

    pub fn op(mut self, op: CompareOp) -> Self {
        self.op = op;
        self
    }
}

impl Declaration for Compare {
    fn resolve(self, entity: &Shape, filter: &Shape, _: &FilterSettings) -> Result<Binding> {
        let e = PropertyRef::resolve(entity, &self.entity)?;
        let f = PropertyRef::resolve(filter, &self.filter)?;
        check_null_inclusion(&self.rules, [&e])?;
        let plan = compare_plan(&e, &f, self.op)?;
        Ok(Binding::Compare {
            entity: e,
            filter: f,
            op: self.op,
            plan,
            rules: self.rules,
        })
    }
}

/// The entity's collection holds the filter's value.
///
/// String elements follow the registration's case handling unless set.
#[derive(Debug, Clone)]
pub struct Contain {
    entity: String,
    filter: String,
    op: ContainOp,
    comparison: Option<StringComparison>,
    rules: BindingRules,
}

impl Contain {
    /// `entity` names the collection property, `filter` the item property.
    pub fn new(entity: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filter: filter.into(),
            op: ContainOp::Contains,
            comparison: None,
            rules: BindingRules::default(),
        }
    }

    pub fn op(mut self, op: ContainOp) -> Self {
        self.op = op;
        self
    }

    /// Case handling for string elements. Ignored for other element types.
    pub fn comparison(mut self, comparison: StringComparison) -> Self {
        self.comparison = Some(comparison);
        self
    }

    pub fn case_insensitive(self) -> Self {
        self.comparison(StringComparison::CaseInsensitive)
    }
}

impl Declaration for Contain {
    fn resolve(self, entity: &Shape, filter: &Shape, settings: &FilterSettings) -> Result<Binding> {
        let e = PropertyRef::resolve(entity, &self.entity)?;
        let f = PropertyRef::resolve(filter, &self.filter)?;
        check_null_inclusion(&self.rules, [&e])?;
        let convert = container_plan(&e, &f)?;
        let comparison = element_comparison(&e, self.comparison, settings);
        Ok(Binding::Contain {
            entity: e,
            filter: f,
            op: self.op,
            convert,
            comparison,
            rules: self.rules,
        })
    }
}

/// The entity's value is in the filter's collection.
#[derive(Debug, Clone)]
pub struct In {
    entity: String,
    filter: String,
    op: MembershipOp,
    comparison: Option<StringComparison>,
    rules: BindingRules,
}

impl In {
    /// `entity` names the item property, `filter` the collection property.
    pub fn new(entity: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filter: filter.into(),
            op: MembershipOp::In,
            comparison: None,
            rules: BindingRules::default(),
        }
    }

    pub fn op(mut self, op: MembershipOp) -> Self {
        self.op = op;
        self
    }

    /// Case handling for string elements. Ignored for other element types.
    pub fn comparison(mut self, comparison: StringComparison) -> Self {
        self.comparison = Some(comparison);
        self
    }

    pub fn case_insensitive(self) -> Self {
        self.comparison(StringComparison::CaseInsensitive)
    }
}

impl Declaration for In {
    fn resolve(self, entity: &Shape, filter: &Shape, settings: &FilterSettings) -> Result<Binding> {
        let e = PropertyRef::resolve(entity, &self.entity)?;
        let f = PropertyRef::resolve(filter, &self.filter)?;
        check_null_inclusion(&self.rules, [&e])?;
        let convert = container_plan(&f, &e)?;
        let comparison = element_comparison(&f, self.comparison, settings);
        Ok(Binding::In {
            entity: e,
            filter: f,
            op: self.op,
            convert,
            comparison,
            rules: self.rules,
        })
    }
}

/// A string test between two string properties, or membership in a list of strings.
///
/// Operator and case handling fall back to the registration's settings. A filter
/// property holding a list of strings defaults to [`StringOp::In`].
#[derive(Debug, Clone)]
pub struct Text {
    entity: String,
    filter: String,
    op: Option<StringOp>,
    comparison: Option<StringComparison>,
    rules: BindingRules,
}

impl Text {
    pub fn new(entity: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            filter: filter.into(),
            op: None,
            comparison: None,
            rules: BindingRules::default(),
        }
    }

    pub fn op(mut self, op: StringOp) -> Self {
        self.op = Some(op);
        self
    }

    pub fn comparison(mut self, comparison: StringComparison) -> Self {
        self.comparison = Some(comparison);
        self
    }

    pub fn case_insensitive(self) -> Self {
        self.comparison(StringComparison::CaseInsensitive)
    }
}

impl Declaration for Text {
    fn resolve(self, entity: &Shape, filter: &Shape, settings: &FilterSettings) -> Result<Binding> {
        let e = PropertyRef::resolve(entity, &self.entity)?;
        let f = PropertyRef::resolve(filter, &self.filter)?;
        let op = self.op.unwrap_or_else(|| {
            if f.value_type.element().is_some_and(ValueType::is_string) {
                StringOp::In
            } else {
                settings.default_string_op
            }
        });
        resolve_string(&e.value_type, &f.value_type, op).map_err(|_| {
            FilterError::InvalidStringBinding {
                entity_property: e.name.to_string(),
                entity_type: e.value_type.to_string(),
                filter_property: f.name.to_string(),
                filter_type: f.value_type.to_string(),
                operator: op.to_string(),
            }
        })?;
        Ok(Binding::Text {
            entity: e,
            filter: f,
            op,
            comparison: self.comparison.unwrap_or(settings.string_comparison),
            rules: self.rules,
        })
    }
}

/// `filter.min <= entity <= filter.max`. Both bounds are inclusive unless set.
#[derive(Debug, Clone)]
pub struct FilterRange {
    min: String,
    entity: String,
    max: String,
    lower: RangeBound,
    upper: RangeBound,
    rules: BindingRules,
}

impl FilterRange {
    pub fn new(min: impl Into<String>, entity: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            entity: entity.into(),
            max: max.into(),
            lower: RangeBound::Inclusive,
            upper: RangeBound::Inclusive,
            rules: BindingRules::default(),
        }
    }

    pub fn lower(mut self, bound: RangeBound) -> Self {
        self.lower = bound;
        self
    }

    pub fn upper(mut self, bound: RangeBound) -> Self {
        self.upper = bound;
        self
    }

    /// Both sides exclusive.
    pub fn exclusive(self) -> Self {
        self.lower(RangeBound::Exclusive).upper(RangeBound::Exclusive)
    }
}

impl Declaration for FilterRange {
    fn resolve(self, entity: &Shape, filter: &Shape, _: &FilterSettings) -> Result<Binding> {
        let e = PropertyRef::resolve(entity, &self.entity)?;
        let min = PropertyRef::resolve(filter, &self.min)?;
        let max = PropertyRef::resolve(filter, &self.max)?;
        check_null_inclusion(&self.rules, [&e])?;

        let min = RangeSide {
            plan: compare_plan(&e, &min, self.lower.lower_op())?,
            bound: min,
            kind: self.lower,
        };
        let max = RangeSide {
            plan: compare_plan(&e, &max, self.upper.upper_op())?,
            bound: max,
            kind: self.upper,
        };
        Ok(Binding::FilterRange {
            entity: e,
            min,
            max,
            rules: self.rules,
        })
    }
}

/// `entity.min <= filter <= entity.max`. Both bounds are inclusive unless set.
#[derive(Debug, Clone)]
pub struct EntityRange {
    min: String,
    filter: String,
    max: String,
    lower: RangeBound,
    upper: RangeBound,
    rules: BindingRules,
}

impl EntityRange {
    pub fn new(min: impl Into<String>, filter: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            filter: filter.into(),
            max: max.into(),
            lower: RangeBound::Inclusive,
            upper: RangeBound::Inclusive,
            rules: BindingRules::default(),
        }
    }

    pub fn lower(mut self, bound: RangeBound) -> Self {
        self.lower = bound;
        self
    }

    pub fn upper(mut self, bound: RangeBound) -> Self {
        self.upper = bound;
        self
    }

    pub fn exclusive(self) -> Self {
        self.lower(RangeBound::Exclusive).upper(RangeBound::Exclusive)
    }
}

impl Declaration for EntityRange {
    fn resolve(self, entity: &Shape, filter: &Shape, _: &FilterSettings) -> Result<Binding> {
        let f = PropertyRef::resolve(filter, &self.filter)?;
        let min = PropertyRef::resolve(entity, &self.min)?;
        let max = PropertyRef::resolve(entity, &self.max)?;
        check_null_inclusion(&self.rules, [&min, &max])?;

        let min = RangeSide {
            plan: compare_plan(&min, &f, self.lower.lower_op())?,
            bound: min,
            kind: self.lower,
        };
        let max = RangeSide {
            plan: compare_plan(&max, &f, self.upper.upper_op())?,
            bound: max,
            kind: self.upper,
        };
        Ok(Binding::EntityRange {
            filter: f,
            min,
            max,
            rules: self.rules,
        })
    }
}

/// A caller-supplied fragment over entity fields and filter fields.
///
/// The expression is inserted into the predicate as is, so it carries its own null and
/// ignore logic. Conditional filter exclusions on the properties it reads still apply.
#[derive(Debug, Clone)]
pub struct Raw {
    label: String,
    expr: Expr,
}

impl Raw {
    pub fn new(label: impl Into<String>, expr: Expr) -> Self {
        Self {
            label: label.into(),
            expr,
        }
    }
}

impl Declaration for Raw {
    fn resolve(self, entity: &Shape, filter: &Shape, _: &FilterSettings) -> Result<Binding> {
        let (mut entity_fields, mut filter_fields) = (Vec::new(), Vec::new());
        self.expr.collect_fields(&mut entity_fields, &mut filter_fields);
        check_indices(entity, &entity_fields)?;
        check_indices(filter, &filter_fields)?;
        Ok(Binding::Raw {
            label: self.label,
            expr: self.expr,
            rules: BindingRules::default(),
        })
    }
}

fn check_indices(shape: &Shape, indices: &[usize]) -> Result<()> {
    match indices.iter().find(|&&idx| idx >= shape.fields().len()) {
        Some(idx) => Err(FilterError::UnknownProperty {
            shape: shape.name().to_string(),
            property: format!("#{idx}"),
        }),
        None => Ok(()),
    }
}

/// Rejects a null rule when none of the entity operands can be null.
fn check_null_inclusion<const N: usize>(
    rules: &BindingRules,
    entity: [&PropertyRef; N],
) -> Result<()> {
    if rules.include_null_if.is_none() || entity.iter().any(|p| p.can_be_null()) {
        return Ok(());
    }
    let first = entity[0];
    Err(FilterError::UnnecessaryNullInclusion {
        entity_property: first.name.to_string(),
        entity_type: first.value_type.to_string(),
    })
}

fn compare_plan(entity: &PropertyRef, filter: &PropertyRef, op: CompareOp) -> Result<ConversionPlan> {
    resolve_comparison(&entity.value_type, &filter.value_type, op).map_err(|reason| {
        FilterError::IncompatibleOperator {
            entity_property: entity.name.to_string(),
            entity_type: entity.value_type.to_string(),
            filter_property: filter.name.to_string(),
            filter_type: filter.value_type.to_string(),
            operator: op.to_string(),
            reason: reason.to_string(),
        }
    })
}

/// Conversion of `item` into the element type of `collection`.
fn element_comparison(
    collection: &PropertyRef,
    requested: Option<StringComparison>,
    settings: &FilterSettings,
) -> Option<StringComparison> {
    collection
        .value_type
        .element()
        .is_some_and(ValueType::is_string)
        .then(|| requested.unwrap_or(settings.string_comparison))
}

fn container_plan(
    collection: &PropertyRef,
    item: &PropertyRef,
) -> Result<Option<NumericType>> {
    let incompatible = |reason: String| FilterError::IncompatibleContainer {
        collection_property: collection.name.to_string(),
        collection_type: collection.value_type.to_string(),
        item_property: item.name.to_string(),
        item_type: item.value_type.to_string(),
        reason,
    };
    let element = collection
        .value_type
        .element()
        .ok_or_else(|| incompatible("not a collection".to_string()))?;
    resolve_containment(element, &item.value_type)
        .map_err(|reason| incompatible(reason.to_string()))
}
