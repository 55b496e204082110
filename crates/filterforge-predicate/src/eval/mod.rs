//! Expression evaluation against records.
//!
//! This is the reference interpreter. [`crate::lower`] turns the same trees into
//! closures; both must agree for every input.


pub mod compare;
pub mod text;

use filterforge_core::{CompareOp, Record, Value};

use crate::expr::Expr;
use compare::{apply, list_contains};

pub use compare::{compare_values, values_equal};
pub use text::{text_in, text_matches};

/// Context for expression evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// The entity being tested.
    pub entity: &'a Record,
    /// The filter instance, for expressions that still hold filter fields.
    pub filter: Option<&'a Record>,
}

impl<'a> EvalContext<'a> {
    pub fn new(entity: &'a Record) -> Self {
        Self {
            entity,
            filter: None,
        }
    }

    pub fn with_filter(entity: &'a Record, filter: &'a Record) -> Self {
        Self {
            entity,
            filter: Some(filter),
        }
    }
}

/// Evaluates an expression in the given context.
pub fn eval_expr(expr: &Expr, ctx: &EvalContext) -> Value {
    match expr {
        Expr::Literal(v) => v.clone(),
        Expr::Field(idx) => ctx.entity.get(*idx).clone(),
        Expr::FilterField(idx) => ctx
            .filter
            .map(|filter| filter.get(*idx).clone())
            .unwrap_or(Value::Null),
        Expr::Convert { expr, to } => eval_expr(expr, ctx).widen(*to).unwrap_or(Value::Null),

        Expr::Eq(l, r) => compare(CompareOp::Equal, l, r, ctx),
        Expr::Ne(l, r) => compare(CompareOp::NotEqual, l, r, ctx),
        Expr::Lt(l, r) => compare(CompareOp::LessThan, l, r, ctx),
        Expr::Le(l, r) => compare(CompareOp::LessOrEqual, l, r, ctx),
        Expr::Gt(l, r) => compare(CompareOp::GreaterThan, l, r, ctx),
        Expr::Ge(l, r) => compare(CompareOp::GreaterOrEqual, l, r, ctx),

        Expr::And(l, r) => Value::Bool(eval_bool(l, ctx) && eval_bool(r, ctx)),
        Expr::Or(l, r) => Value::Bool(eval_bool(l, ctx) || eval_bool(r, ctx)),
        Expr::Not(e) => Value::Bool(!eval_bool(e, ctx)),

        Expr::IsNull(e) => Value::Bool(eval_expr(e, ctx).is_null()),
        Expr::IsNotNull(e) => Value::Bool(!eval_expr(e, ctx).is_null()),

        Expr::Contains { collection, item } => {
            let collection = eval_expr(collection, ctx);
            let item = eval_expr(item, ctx);
            Value::Bool(list_contains(&collection, &item))
        }

        Expr::Text {
            op,
            value,
            pattern,
            comparison,
        } => {
            let value = eval_expr(value, ctx);
            let pattern = eval_expr(pattern, ctx);
            Value::Bool(text_matches(*op, &value, &pattern, *comparison))
        }

        Expr::TextIn {
            collection,
            item,
            comparison,
        } => {
            let collection = eval_expr(collection, ctx);
            let item = eval_expr(item, ctx);
            Value::Bool(text_in(&collection, &item, *comparison))
        }
    }
}

/// Evaluates an expression as a condition. Anything but `true` is false.
pub fn eval_bool(expr: &Expr, ctx: &EvalContext) -> bool {
    matches!(eval_expr(expr, ctx), Value::Bool(true))
}

fn compare(op: CompareOp, l: &Expr, r: &Expr, ctx: &EvalContext) -> Value {
    let l = eval_expr(l, ctx);
    let r = eval_expr(r, ctx);
    Value::Bool(apply(op, &l, &r))
}
