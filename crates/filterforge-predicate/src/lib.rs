//! FilterForge Predicate - expression trees and the predicate compiler
//!
//! Turns resolved bindings into compiled filters:
//! - [`Expr`] trees over an entity record and a filter record
//! - An interpreter ([`eval`]) and a closure lowering ([`lower`]) that agree on every input
//! - The binding model with its reversal, null-inclusion and ignore rules
//! - [`compile`], producing one [`CompiledFilter`] per shape pair
//!
//! # Example
//!
//! ```
//! use filterforge_core::{CompareOp, ConversionPlan, Shape, ValueType};
//! use filterforge_predicate::{compile, Binding, BindingRules, PropertyRef};
//!
//! let book = Shape::builder("Book").field("Year", ValueType::I32).build().unwrap();
//! let filter = Shape::builder("Since").field("Year", ValueType::I32.or_null()).build().unwrap();
//!
//! let binding = Binding::Compare {
//!     entity: PropertyRef::resolve(&book, "Year").unwrap(),
//!     filter: PropertyRef::resolve(&filter, "Year").unwrap(),
//!     op: CompareOp::GreaterOrEqual,
//!     plan: ConversionPlan::default(),
//!     rules: BindingRules::default(),
//! };
//! let compiled = compile(&book, &filter, &[binding]);
//!
//! let since = filter.record([("Year", 2010)]).unwrap();
//! let predicate = compiled.predicate(&since).unwrap();
//! assert_eq!(predicate.to_string(), "(Year >= 2010)");
//! assert!(predicate.matches(&book.record([("Year", 2012)]).unwrap()));
//! assert!(!predicate.matches(&book.record([("Year", 2008)]).unwrap()));
//! ```

pub mod binding;
pub mod compile;
pub mod eval;
pub mod expr;
pub mod lower;

pub use binding::{
    Binding, BindingKey, BindingRules, FilterCondition, NullInclusion, PropertyRef, RangeSide,
};
pub use compile::{compile, CompiledFilter, Predicate};
pub use eval::{eval_bool, eval_expr, EvalContext};
pub use expr::{Expr, ExprDisplay, TextOp};
pub use lower::BoolFn;
