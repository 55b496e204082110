use std::fmt;
use std::sync::Arc;

use filterforge_core::{Record, Shape};

use crate::expr::Expr;
use crate::lower::{lower, BoolFn};

/// A predicate over entity records, bound to one filter instance.
///
/// Holds the inspectable [`Expr`] for query translators and the closure lowered from
/// it for direct evaluation. `Display` renders the expression with field names.
pub struct Predicate {
    expr: Expr,
    entity_shape: Arc<Shape>,
    eval: BoolFn,
}

impl Predicate {
    /// Lowers `expr`, which must not hold filter fields.
    pub fn new(expr: Expr, entity_shape: Arc<Shape>) -> Self {
        let eval = lower(&expr);
        Self {
            expr,
            entity_shape,
            eval,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn entity_shape(&self) -> &Arc<Shape> {
        &self.entity_shape
    }

    /// Returns true if `entity` satisfies the predicate.
    ///
    /// The record's shape is not checked; it must be the entity shape.
    pub fn matches(&self, entity: &Record) -> bool {
        (self.eval)(entity)
    }

    /// Borrows the predicate as a plain function.
    pub fn as_fn(&self) -> impl Fn(&Record) -> bool + '_ {
        move |entity: &Record| (self.eval)(entity)
    }

    /// Consumes the predicate, keeping only the callable form.
    pub fn into_fn(self) -> BoolFn {
        self.eval
    }

    /// Iterates over the entities that satisfy the predicate.
    pub fn select<'a, I>(&'a self, entities: I) -> impl Iterator<Item = &'a Record> + 'a
    where
        I: IntoIterator<Item = &'a Record>,
        I::IntoIter: 'a,
    {
        entities.into_iter().filter(move |entity| self.matches(entity))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr.display(&self.entity_shape))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("entity_shape", &self.entity_shape.name())
            .field("expr", &self.expr)
            .finish_non_exhaustive()
    }
}
