//! Lowering of expression trees into closures.
//!
//! A bound expression (no filter fields left) is turned once into a tree of small
//! boxed closures, which is then invoked per entity without walking the `Expr`
//! again. Literal operands are captured by value and borrowed at call time.

use std::borrow::Cow;
use std::cmp::Ordering;

use filterforge_core::{CompareOp, Record, Value};

use crate::eval::compare::{apply, compare_values, list_contains};
use crate::eval::{text_in, text_matches};
use crate::expr::Expr;

/// A lowered boolean predicate over entity records.
pub type BoolFn = Box<dyn Fn(&Record) -> bool + Send + Sync>;

type ValueFn = Box<dyn for<'r> Fn(&'r Record) -> Cow<'r, Value> + Send + Sync>;

fn bool_fn<F>(f: F) -> BoolFn
where
    F: Fn(&Record) -> bool + Send + Sync + 'static,
{
    Box::new(f)
}

fn value_fn<F>(f: F) -> ValueFn
where
    F: for<'r> Fn(&'r Record) -> Cow<'r, Value> + Send + Sync + 'static,
{
    Box::new(f)
}

/// An operand of a lowered node.
enum Operand {
    Const(Value),
    Field(usize),
    Dynamic(ValueFn),
}

impl Operand {
    fn get<'r>(&'r self, record: &'r Record) -> Cow<'r, Value> {
        match self {
            Operand::Const(value) => Cow::Borrowed(value),
            Operand::Field(idx) => Cow::Borrowed(record.get(*idx)),
            Operand::Dynamic(f) => f(record),
        }
    }
}

/// Lowers an expression into a boolean closure.
///
/// Filter fields that were not bound read as null.
pub fn lower(expr: &Expr) -> BoolFn {
    match expr {
        Expr::Literal(value) => {
            let b = matches!(value, Value::Bool(true));
            bool_fn(move |_| b)
        }

        Expr::Eq(l, r) => lower_compare(CompareOp::Equal, l, r),
        Expr::Ne(l, r) => lower_compare(CompareOp::NotEqual, l, r),
        Expr::Lt(l, r) => lower_ordering(l, r, Ordering::is_lt),
        Expr::Le(l, r) => lower_ordering(l, r, Ordering::is_le),
        Expr::Gt(l, r) => lower_ordering(l, r, Ordering::is_gt),
        Expr::Ge(l, r) => lower_ordering(l, r, Ordering::is_ge),

        Expr::And(l, r) => {
            let (l, r) = (lower(l), lower(r));
            bool_fn(move |rec| l(rec) && r(rec))
        }
        Expr::Or(l, r) => {
            let (l, r) = (lower(l), lower(r));
            bool_fn(move |rec| l(rec) || r(rec))
        }
        Expr::Not(e) => {
            let e = lower(e);
            bool_fn(move |rec| !e(rec))
        }

        Expr::IsNull(e) => {
            let e = lower_operand(e);
            bool_fn(move |rec| e.get(rec).is_null())
        }
        Expr::IsNotNull(e) => {
            let e = lower_operand(e);
            bool_fn(move |rec| !e.get(rec).is_null())
        }

        Expr::Contains { collection, item } => {
            let (collection, item) = (lower_operand(collection), lower_operand(item));
            bool_fn(move |rec| list_contains(&collection.get(rec), &item.get(rec)))
        }

        Expr::Text {
            op,
            value,
            pattern,
            comparison,
        } => {
            let (op, comparison) = (*op, *comparison);
            let (value, pattern) = (lower_operand(value), lower_operand(pattern));
            bool_fn(move |rec| text_matches(op, &value.get(rec), &pattern.get(rec), comparison))
        }

        Expr::TextIn {
            collection,
            item,
            comparison,
        } => {
            let comparison = *comparison;
            let (collection, item) = (lower_operand(collection), lower_operand(item));
            bool_fn(move |rec| text_in(&collection.get(rec), &item.get(rec), comparison))
        }

        Expr::Field(_) | Expr::FilterField(_) | Expr::Convert { .. } => {
            let value = lower_operand(expr);
            bool_fn(move |rec| matches!(value.get(rec).as_ref(), Value::Bool(true)))
        }
    }
}

fn lower_compare(op: CompareOp, l: &Expr, r: &Expr) -> BoolFn {
    match (lower_operand(l), lower_operand(r)) {
        (Operand::Field(idx), Operand::Const(value)) => {
            bool_fn(move |rec| apply(op, rec.get(idx), &value))
        }
        (l, r) => bool_fn(move |rec| apply(op, &l.get(rec), &r.get(rec))),
    }
}

fn lower_ordering(l: &Expr, r: &Expr, test: fn(Ordering) -> bool) -> BoolFn {
    match (lower_operand(l), lower_operand(r)) {
        (Operand::Field(idx), Operand::Const(value)) => {
            bool_fn(move |rec| compare_values(rec.get(idx), &value).is_some_and(test))
        }
        (l, r) => bool_fn(move |rec| compare_values(&l.get(rec), &r.get(rec)).is_some_and(test)),
    }
}

fn lower_operand(expr: &Expr) -> Operand {
    match expr {
        Expr::Literal(value) => Operand::Const(value.clone()),
        Expr::Field(idx) => Operand::Field(*idx),
        Expr::FilterField(_) => Operand::Const(Value::Null),
        Expr::Convert { expr, to } => {
            let to = *to;
            match lower_operand(expr) {
                Operand::Const(value) => Operand::Const(value.widen(to).unwrap_or(Value::Null)),
                inner => Operand::Dynamic(value_fn(move |rec| {
                    Cow::Owned(inner.get(rec).widen(to).unwrap_or(Value::Null))
                })),
            }
        }
        condition => {
            let f = lower(condition);
            Operand::Dynamic(value_fn(move |rec| Cow::Owned(Value::Bool(f(rec)))))
        }
    }
}
