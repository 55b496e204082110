//! Expression trees for compiled predicates.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use filterforge_core::{CompareOp, NumericType, Record, Shape, StringComparison, Value};

/// String test applied by [`Expr::Text`]. Negated forms wrap it in [`Expr::Not`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextOp {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
}

impl TextOp {
    pub fn name(self) -> &'static str {
        match self {
            TextOp::Equals => "equals",
            TextOp::Contains => "contains",
            TextOp::StartsWith => "starts_with",
            TextOp::EndsWith => "ends_with",
        }
    }
}

/// An expression tree node.
///
/// Expressions are evaluated against one entity record. `FilterField` nodes refer to
/// the filter instance and are replaced by literals with [`Expr::bind_filter`] before
/// a predicate is lowered.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// Field of the entity record, by index.
    Field(usize),
    /// Field of the filter record, by index.
    FilterField(usize),
    Convert {
        expr: Box<Expr>,
        to: NumericType,
    },

    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),

    IsNull(Box<Expr>),
    IsNotNull(Box<Expr>),

    /// Collection membership under equality.
    Contains {
        collection: Box<Expr>,
        item: Box<Expr>,
    },

    Text {
        op: TextOp,
        value: Box<Expr>,
        pattern: Box<Expr>,
        comparison: StringComparison,
    },

    /// String membership in a list of strings.
    TextIn {
        collection: Box<Expr>,
        item: Box<Expr>,
        comparison: StringComparison,
    },
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn bool(value: bool) -> Self {
        Expr::Literal(Value::Bool(value))
    }

    pub fn field(idx: usize) -> Self {
        Expr::Field(idx)
    }

    pub fn filter_field(idx: usize) -> Self {
        Expr::FilterField(idx)
    }

    pub fn convert(expr: Expr, to: NumericType) -> Self {
        Expr::Convert {
            expr: Box::new(expr),
            to,
        }
    }

    /// Wraps `expr` in a conversion when `to` is set.
    pub fn convert_opt(expr: Expr, to: Option<NumericType>) -> Self {
        match to {
            Some(to) => Expr::convert(expr, to),
            None => expr,
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::Eq(Box::new(left), Box::new(right))
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Expr::Ne(Box::new(left), Box::new(right))
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Expr::Lt(Box::new(left), Box::new(right))
    }

    pub fn le(left: Expr, right: Expr) -> Self {
        Expr::Le(Box::new(left), Box::new(right))
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Expr::Gt(Box::new(left), Box::new(right))
    }

    pub fn ge(left: Expr, right: Expr) -> Self {
        Expr::Ge(Box::new(left), Box::new(right))
    }

    /// Applies a comparison operator to two operands.
    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        match op {
            CompareOp::Equal => Expr::eq(left, right),
            CompareOp::NotEqual => Expr::ne(left, right),
            CompareOp::GreaterThan => Expr::gt(left, right),
            CompareOp::GreaterOrEqual => Expr::ge(left, right),
            CompareOp::LessThan => Expr::lt(left, right),
            CompareOp::LessOrEqual => Expr::le(left, right),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or(Box::new(left), Box::new(right))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expr) -> Self {
        Expr::Not(Box::new(expr))
    }

    pub fn is_null(expr: Expr) -> Self {
        Expr::IsNull(Box::new(expr))
    }

    pub fn is_not_null(expr: Expr) -> Self {
        Expr::IsNotNull(Box::new(expr))
    }

    pub fn contains(collection: Expr, item: Expr) -> Self {
        Expr::Contains {
            collection: Box::new(collection),
            item: Box::new(item),
        }
    }

    pub fn text(op: TextOp, value: Expr, pattern: Expr, comparison: StringComparison) -> Self {
        Expr::Text {
            op,
            value: Box::new(value),
            pattern: Box::new(pattern),
            comparison,
        }
    }

    pub fn text_in(collection: Expr, item: Expr, comparison: StringComparison) -> Self {
        Expr::TextIn {
            collection: Box::new(collection),
            item: Box::new(item),
            comparison,
        }
    }

    /// Conjunction of all expressions; `true` when empty.
    pub fn and_all(exprs: impl IntoIterator<Item = Expr>) -> Self {
        exprs
            .into_iter()
            .reduce(Expr::and)
            .unwrap_or(Expr::bool(true))
    }

    /// Disjunction of all expressions; `false` when empty.
    pub fn or_all(exprs: impl IntoIterator<Item = Expr>) -> Self {
        exprs
            .into_iter()
            .reduce(Expr::or)
            .unwrap_or(Expr::bool(false))
    }

    /// Replaces filter fields with the values of `filter`.
    ///
    /// Conversions over literals are folded, so the result refers to the entity only.
    pub fn bind_filter(&self, filter: &Record) -> Expr {
        match self {
            Expr::Literal(_) | Expr::Field(_) => self.clone(),
            Expr::FilterField(idx) => Expr::Literal(filter.get(*idx).clone()),
            Expr::Convert { expr, to } => match expr.bind_filter(filter) {
                Expr::Literal(value) => match value.widen(*to) {
                    Some(widened) => Expr::Literal(widened),
                    None => Expr::convert(Expr::Literal(value), *to),
                },
                bound => Expr::convert(bound, *to),
            },
            Expr::Eq(l, r) => Expr::Eq(l.bound(filter), r.bound(filter)),
            Expr::Ne(l, r) => Expr::Ne(l.bound(filter), r.bound(filter)),
            Expr::Lt(l, r) => Expr::Lt(l.bound(filter), r.bound(filter)),
            Expr::Le(l, r) => Expr::Le(l.bound(filter), r.bound(filter)),
            Expr::Gt(l, r) => Expr::Gt(l.bound(filter), r.bound(filter)),
            Expr::Ge(l, r) => Expr::Ge(l.bound(filter), r.bound(filter)),
            Expr::And(l, r) => Expr::And(l.bound(filter), r.bound(filter)),
            Expr::Or(l, r) => Expr::Or(l.bound(filter), r.bound(filter)),
            Expr::Not(e) => Expr::Not(e.bound(filter)),
            Expr::IsNull(e) => Expr::IsNull(e.bound(filter)),
            Expr::IsNotNull(e) => Expr::IsNotNull(e.bound(filter)),
            Expr::Contains { collection, item } => Expr::Contains {
                collection: collection.bound(filter),
                item: item.bound(filter),
            },
            Expr::Text {
                op,
                value,
                pattern,
                comparison,
            } => Expr::Text {
                op: *op,
                value: value.bound(filter),
                pattern: pattern.bound(filter),
                comparison: *comparison,
            },
            Expr::TextIn {
                collection,
                item,
                comparison,
            } => Expr::TextIn {
                collection: collection.bound(filter),
                item: item.bound(filter),
                comparison: *comparison,
            },
        }
    }

    fn bound(&self, filter: &Record) -> Box<Expr> {
        Box::new(self.bind_filter(filter))
    }

    /// Collects the entity and filter field indices this expression reads.
    pub fn collect_fields(&self, entity: &mut Vec<usize>, filter: &mut Vec<usize>) {
        match self {
            Expr::Literal(_) => {}
            Expr::Field(idx) => entity.push(*idx),
            Expr::FilterField(idx) => filter.push(*idx),
            Expr::Convert { expr: e, .. }
            | Expr::Not(e)
            | Expr::IsNull(e)
            | Expr::IsNotNull(e) => e.collect_fields(entity, filter),
            Expr::Eq(l, r)
            | Expr::Ne(l, r)
            | Expr::Lt(l, r)
            | Expr::Le(l, r)
            | Expr::Gt(l, r)
            | Expr::Ge(l, r)
            | Expr::And(l, r)
            | Expr::Or(l, r)
            | Expr::Contains {
                collection: l,
                item: r,
            }
            | Expr::Text {
                value: l,
                pattern: r,
                ..
            }
            | Expr::TextIn {
                collection: l,
                item: r,
                ..
            } => {
                l.collect_fields(entity, filter);
                r.collect_fields(entity, filter);
            }
        }
    }

    /// Renders the expression with field names taken from `entity`.
    pub fn display<'a>(&'a self, entity: &'a Shape) -> ExprDisplay<'a> {
        ExprDisplay {
            expr: self,
            entity,
            filter: None,
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Self::Output {
        Expr::Not(Box::new(self))
    }
}

impl BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Self) -> Self::Output {
        Expr::and(self, rhs)
    }
}

impl BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Self) -> Self::Output {
        Expr::or(self, rhs)
    }
}

/// [`Expr`] rendered with field names, for query translators and logs.
///
/// ```
/// use filterforge_core::{Shape, ValueType};
/// use filterforge_predicate::Expr;
///
/// let shape = Shape::builder("Book").field("Year", ValueType::I32).build().unwrap();
/// let expr = Expr::ge(Expr::field(0), Expr::literal(2000));
/// assert_eq!(expr.display(&shape).to_string(), "(Year >= 2000)");
/// ```
pub struct ExprDisplay<'a> {
    expr: &'a Expr,
    entity: &'a Shape,
    filter: Option<&'a Shape>,
}

impl<'a> ExprDisplay<'a> {
    /// Names filter fields after `filter` instead of by index.
    pub fn with_filter(mut self, filter: &'a Shape) -> Self {
        self.filter = Some(filter);
        self
    }

    fn child(&self, expr: &'a Expr) -> ExprDisplay<'a> {
        ExprDisplay {
            expr,
            entity: self.entity,
            filter: self.filter,
        }
    }

    fn binary(&self, f: &mut fmt::Formatter<'_>, l: &'a Expr, op: &str, r: &'a Expr) -> fmt::Result {
        write!(f, "({} {op} {})", self.child(l), self.child(r))
    }
}

fn case_suffix(comparison: StringComparison) -> &'static str {
    match comparison {
        StringComparison::CaseSensitive => "",
        StringComparison::CaseInsensitive => ", ignore_case",
    }
}

impl fmt::Display for ExprDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expr {
            Expr::Literal(value) => write!(f, "{value}"),
            Expr::Field(idx) => match self.entity.fields().get(*idx) {
                Some(field) => f.write_str(&field.name),
                None => write!(f, "${idx}"),
            },
            Expr::FilterField(idx) => match self.filter.and_then(|s| s.fields().get(*idx)) {
                Some(field) => write!(f, "filter.{}", field.name),
                None => write!(f, "filter.${idx}"),
            },
            Expr::Convert { expr, to } => write!(f, "{to}({})", self.child(expr)),
            Expr::Eq(l, r) => self.binary(f, l, "==", r),
            Expr::Ne(l, r) => self.binary(f, l, "!=", r),
            Expr::Lt(l, r) => self.binary(f, l, "<", r),
            Expr::Le(l, r) => self.binary(f, l, "<=", r),
            Expr::Gt(l, r) => self.binary(f, l, ">", r),
            Expr::Ge(l, r) => self.binary(f, l, ">=", r),
            Expr::And(l, r) => self.binary(f, l, "&&", r),
            Expr::Or(l, r) => self.binary(f, l, "||", r),
            Expr::Not(e) => write!(f, "!{}", self.child(e)),
            Expr::IsNull(e) => write!(f, "({} is null)", self.child(e)),
            Expr::IsNotNull(e) => write!(f, "({} is not null)", self.child(e)),
            Expr::Contains { collection, item } => {
                write!(f, "{}.contains({})", self.child(collection), self.child(item))
            }
            Expr::Text {
                op,
                value,
                pattern,
                comparison,
            } => write!(
                f,
                "{}.{}({}{})",
                self.child(value),
                op.name(),
                self.child(pattern),
                case_suffix(*comparison)
            ),
            Expr::TextIn {
                collection,
                item,
                comparison,
            } => write!(
                f,
                "{}.contains({}{})",
                self.child(collection),
                self.child(item),
                case_suffix(*comparison)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filterforge_core::ValueType;

    fn shapes() -> (std::sync::Arc<Shape>, std::sync::Arc<Shape>) {
        let entity = Shape::builder("Book")
            .field("Name", ValueType::String)
            .field("Year", ValueType::I32)
            .build()
            .unwrap();
        let filter = Shape::builder("BookFilter")
            .field("Year", ValueType::U8.or_null())
            .build()
            .unwrap();
        (entity, filter)
    }

    #[test]
    fn test_and_all_empty_is_true() {
        assert_eq!(Expr::and_all(Vec::new()), Expr::bool(true));
        assert_eq!(Expr::or_all(Vec::new()), Expr::bool(false));
        let single = Expr::and_all([Expr::field(0)]);
        assert_eq!(single, Expr::field(0));
    }

    #[test]
    fn test_bind_filter_folds_conversions() {
        let (_, filter_shape) = shapes();
        let filter = filter_shape.record([("Year", Value::U8(7))]).unwrap();
        let expr = Expr::eq(
            Expr::field(1),
            Expr::convert(Expr::filter_field(0), NumericType::I32),
        );
        assert_eq!(
            expr.bind_filter(&filter),
            Expr::eq(Expr::field(1), Expr::Literal(Value::I32(7)))
        );

        let null_filter = filter_shape.record([("Year", Value::Null)]).unwrap();
        assert_eq!(
            expr.bind_filter(&null_filter),
            Expr::eq(Expr::field(1), Expr::Literal(Value::Null))
        );
    }

    #[test]
    fn test_collect_fields() {
        let expr = Expr::ge(Expr::field(1), Expr::filter_field(0))
            & Expr::text(
                TextOp::StartsWith,
                Expr::field(0),
                Expr::literal("B"),
                StringComparison::CaseSensitive,
            );
        let (mut entity, mut filter) = (Vec::new(), Vec::new());
        expr.collect_fields(&mut entity, &mut filter);
        assert_eq!(entity, vec![1, 0]);
        assert_eq!(filter, vec![0]);
    }

    #[test]
    fn test_display_with_names() {
        let (entity, filter) = shapes();
        let expr = Expr::is_null(Expr::field(1))
            | Expr::ge(
                Expr::convert(Expr::field(1), NumericType::I64),
                Expr::filter_field(0),
            );
        assert_eq!(
            expr.display(&entity).with_filter(&filter).to_string(),
            "((Year is null) || (i64(Year) >= filter.Year))"
        );

        let text = !Expr::text(
            TextOp::Contains,
            Expr::field(0),
            Expr::literal("test"),
            StringComparison::CaseInsensitive,
        );
        assert_eq!(
            text.display(&entity).to_string(),
            "!Name.contains(\"test\", ignore_case)"
        );
    }
}
