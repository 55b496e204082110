//! The predicate compiler.
//!
//! [`compile`] turns a binding set into a [`CompiledFilter`] once per shape pair. Each
//! binding becomes a template holding the normal and the reversed expression of every
//! side, so per-filter work is limited to evaluating rules and substituting filter
//! values. [`CompiledFilter::predicate`] then yields a [`Predicate`] carrying both the
//! inspectable expression and its lowered closure.

#[cfg(test)]
mod tests;

mod predicate;

pub use predicate::Predicate;

use std::sync::Arc;

use smallvec::{smallvec, SmallVec};
use tracing::debug;

use filterforge_core::{CompareOp, FilterError, Record, Result, Shape, ShapePair, StringOp};

use crate::binding::{Binding, BindingRules, PropertyRef, RangeSide};
use crate::eval::{eval_bool, EvalContext};
use crate::expr::{Expr, TextOp};

/// One side of a compiled binding.
#[derive(Debug, Clone)]
struct Side {
    normal: Expr,
    inverse: Expr,
    /// Filter field whose null value drops this side.
    guard: Option<usize>,
    /// Entity field tested by null inclusion.
    null_operand: Option<usize>,
}

impl Side {
    fn new(normal: Expr, inverse: Expr) -> Self {
        Self {
            normal,
            inverse,
            guard: None,
            null_operand: None,
        }
    }

    fn guarded_by(mut self, guard: Option<usize>) -> Self {
        self.guard = guard;
        self
    }

    fn null_operand(mut self, property: &PropertyRef) -> Self {
        self.null_operand = property.can_be_null().then_some(property.index);
        self
    }
}

/// A binding lowered to expression templates.
#[derive(Debug, Clone)]
struct CompiledBinding {
    label: String,
    sides: SmallVec<[Side; 2]>,
    rules: BindingRules,
    /// Filter field whose null value ignores the whole binding.
    default_ignore: Option<usize>,
}

impl CompiledBinding {
    fn ignored(&self, filter: &Record) -> bool {
        self.rules.ignore_if.as_ref().is_some_and(|f| f(filter))
            || self.rules.exclusions.iter().any(|f| f(filter))
            || self
                .default_ignore
                .is_some_and(|idx| filter.get(idx).is_null())
    }

    /// The binding's contribution for one filter instance; `None` when ignored.
    fn fragment(&self, filter: &Record) -> Option<Expr> {
        if self.ignored(filter) {
            return None;
        }
        let reversed = self.rules.reverse_if.as_ref().is_some_and(|f| f(filter));
        let include_null = self.rules.include_null_if.as_ref().and_then(|f| f(filter));

        let sides: SmallVec<[Expr; 2]> = self
            .sides
            .iter()
            .filter(|side| side.guard.map_or(true, |idx| !filter.get(idx).is_null()))
            .map(|side| {
                let base = if reversed { &side.inverse } else { &side.normal };
                let base = base.bind_filter(filter);
                match (include_null, side.null_operand) {
                    (Some(true), Some(idx)) => Expr::is_null(Expr::field(idx)) | base,
                    (Some(false), Some(idx)) => Expr::is_not_null(Expr::field(idx)) & base,
                    _ => base,
                }
            })
            .collect();

        if sides.is_empty() {
            return None;
        }
        // A reversed range is the negation of its conjunction.
        Some(if reversed {
            Expr::or_all(sides)
        } else {
            Expr::and_all(sides)
        })
    }
}

/// The compiled filter of one shape pair. Immutable and shareable across threads.
#[derive(Debug, Clone)]
pub struct CompiledFilter {
    pair: ShapePair,
    entity_shape: Arc<Shape>,
    filter_shape: Arc<Shape>,
    bindings: Vec<CompiledBinding>,
}

impl CompiledFilter {
    pub fn pair(&self) -> &ShapePair {
        &self.pair
    }

    pub fn entity_shape(&self) -> &Arc<Shape> {
        &self.entity_shape
    }

    pub fn filter_shape(&self) -> &Arc<Shape> {
        &self.filter_shape
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// Labels of the compiled bindings, in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|b| b.label.as_str())
    }

    /// The inspectable predicate for one filter instance.
    ///
    /// The AND of every binding that is not ignored, or a `true` literal when all are.
    pub fn expr(&self, filter: &Record) -> Result<Expr> {
        check_shape(&self.filter_shape, filter)?;
        Ok(Expr::and_all(
            self.bindings.iter().filter_map(|b| b.fragment(filter)),
        ))
    }

    /// The predicate for one filter instance, inspectable and directly callable.
    pub fn predicate(&self, filter: &Record) -> Result<Predicate> {
        let expr = self.expr(filter)?;
        Ok(Predicate::new(expr, Arc::clone(&self.entity_shape)))
    }

    /// Evaluates the predicate for one entity with the interpreter.
    pub fn matches(&self, filter: &Record, entity: &Record) -> Result<bool> {
        check_shape(&self.entity_shape, entity)?;
        let expr = self.expr(filter)?;
        Ok(eval_bool(&expr, &EvalContext::new(entity)))
    }
}

fn check_shape(expected: &Shape, record: &Record) -> Result<()> {
    if record.shape().name() == expected.name() {
        Ok(())
    } else {
        Err(FilterError::InvalidRecord {
            shape: expected.name().to_string(),
            reason: format!("got a record of shape {}", record.shape().name()),
        })
    }
}

/// Compiles a binding set for one shape pair.
pub fn compile(entity: &Arc<Shape>, filter: &Arc<Shape>, bindings: &[Binding]) -> CompiledFilter {
    let bindings: Vec<CompiledBinding> = bindings.iter().map(compile_binding).collect();
    debug!(
        event = "compile",
        entity = %entity.name(),
        filter = %filter.name(),
        bindings = bindings.len(),
    );
    CompiledFilter {
        pair: ShapePair::new(entity, filter),
        entity_shape: Arc::clone(entity),
        filter_shape: Arc::clone(filter),
        bindings,
    }
}

/// `base` under an operator's polarity.
fn signed(base: &Expr, negated: bool) -> Expr {
    if negated {
        !base.clone()
    } else {
        base.clone()
    }
}

fn default_ignore(filter: &PropertyRef, rules: &BindingRules) -> Option<usize> {
    (filter.can_be_null() && rules.uses_default_ignore()).then_some(filter.index)
}

fn text_op(op: StringOp) -> TextOp {
    match op {
        StringOp::Equal | StringOp::NotEqual | StringOp::In | StringOp::NotIn => TextOp::Equals,
        StringOp::Contains | StringOp::NotContains => TextOp::Contains,
        StringOp::StartsWith | StringOp::NotStartsWith => TextOp::StartsWith,
        StringOp::EndsWith | StringOp::NotEndsWith => TextOp::EndsWith,
    }
}

fn compile_binding(binding: &Binding) -> CompiledBinding {
    let label = binding.label();
    match binding {
        Binding::Compare {
            entity,
            filter,
            op,
            plan,
            rules,
        } => {
            let l = Expr::convert_opt(Expr::field(entity.index), plan.entity);
            let r = Expr::convert_opt(Expr::filter_field(filter.index), plan.filter);
            let side = Side::new(
                Expr::compare(*op, l.clone(), r.clone()),
                Expr::compare(op.inverse(), l, r),
            )
            .null_operand(entity);
            CompiledBinding {
                label,
                sides: smallvec![side],
                rules: rules.clone(),
                default_ignore: default_ignore(filter, rules),
            }
        }

        Binding::Contain {
            entity,
            filter,
            op,
            convert,
            comparison,
            rules,
        } => {
            let item = Expr::convert_opt(Expr::filter_field(filter.index), *convert);
            let base = match comparison {
                Some(comparison) => Expr::text_in(Expr::field(entity.index), item, *comparison),
                None => Expr::contains(Expr::field(entity.index), item),
            };
            let side = Side::new(
                signed(&base, op.is_negated()),
                signed(&base, op.inverse().is_negated()),
            );
            CompiledBinding {
                label,
                sides: smallvec![side.null_operand(entity)],
                rules: rules.clone(),
                default_ignore: default_ignore(filter, rules),
            }
        }

        Binding::In {
            entity,
            filter,
            op,
            convert,
            comparison,
            rules,
        } => {
            let item = Expr::convert_opt(Expr::field(entity.index), *convert);
            let base = match comparison {
                Some(comparison) => {
                    Expr::text_in(Expr::filter_field(filter.index), item, *comparison)
                }
                None => Expr::contains(Expr::filter_field(filter.index), item),
            };
            let side = Side::new(
                signed(&base, op.is_negated()),
                signed(&base, op.inverse().is_negated()),
            );
            CompiledBinding {
                label,
                sides: smallvec![side.null_operand(entity)],
                rules: rules.clone(),
                default_ignore: default_ignore(filter, rules),
            }
        }

        Binding::Text {
            entity,
            filter,
            op,
            comparison,
            rules,
        } => {
            let base = if op.is_membership() {
                Expr::text_in(
                    Expr::filter_field(filter.index),
                    Expr::field(entity.index),
                    *comparison,
                )
            } else {
                Expr::text(
                    text_op(*op),
                    Expr::field(entity.index),
                    Expr::filter_field(filter.index),
                    *comparison,
                )
            };
            let side = Side::new(
                signed(&base, op.is_negated()),
                signed(&base, op.inverse().is_negated()),
            );
            CompiledBinding {
                label,
                sides: smallvec![side.null_operand(entity)],
                rules: rules.clone(),
                default_ignore: default_ignore(filter, rules),
            }
        }

        Binding::FilterRange {
            entity,
            min,
            max,
            rules,
        } => {
            let side = |range: &RangeSide, op: CompareOp| {
                let l = Expr::convert_opt(Expr::field(entity.index), range.plan.entity);
                let r = Expr::convert_opt(Expr::filter_field(range.bound.index), range.plan.filter);
                let guard = (range.bound.can_be_null() && rules.uses_default_ignore())
                    .then_some(range.bound.index);
                Side::new(
                    Expr::compare(op, l.clone(), r.clone()),
                    Expr::compare(op.inverse(), l, r),
                )
                .guarded_by(guard)
                .null_operand(entity)
            };
            CompiledBinding {
                label,
                sides: smallvec![side(min, min.kind.lower_op()), side(max, max.kind.upper_op())],
                rules: rules.clone(),
                default_ignore: None,
            }
        }

        Binding::EntityRange {
            filter,
            min,
            max,
            rules,
        } => {
            let side = |range: &RangeSide, op: CompareOp| {
                let l = Expr::convert_opt(Expr::filter_field(filter.index), range.plan.filter);
                let r = Expr::convert_opt(Expr::field(range.bound.index), range.plan.entity);
                Side::new(
                    Expr::compare(op, l.clone(), r.clone()),
                    Expr::compare(op.inverse(), l, r),
                )
                .null_operand(&range.bound)
            };
            CompiledBinding {
                label,
                sides: smallvec![side(min, min.kind.lower_op()), side(max, max.kind.upper_op())],
                rules: rules.clone(),
                default_ignore: default_ignore(filter, rules),
            }
        }

        Binding::Raw { expr, rules, .. } => CompiledBinding {
            label,
            sides: smallvec![Side::new(expr.clone(), !expr.clone())],
            rules: BindingRules {
                exclusions: rules.exclusions.clone(),
                ..BindingRules::default()
            },
            default_ignore: None,
        },
    }
}
