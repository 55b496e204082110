//! FilterForge Core - the type system underneath the predicate compiler
//!
//! This crate provides the pieces every other FilterForge crate builds on:
//! - Value types and runtime values for runtime-described record shapes
//! - Shape descriptors and records
//! - Comparison, containment and string operators
//! - The type compatibility resolver deciding which bindings are legal
//! - The error type surfaced to callers

pub mod error;
pub mod operator;
pub mod resolve;
pub mod shape;
pub mod types;
pub mod value;

pub use error::{FilterError, Result};
pub use operator::{CompareOp, ContainOp, MembershipOp, RangeBound, StringComparison, StringOp};
pub use resolve::{ConversionPlan, Incompatibility, Relation};
pub use shape::{FieldDef, Record, Shape, ShapeBuilder, ShapePair};
pub use types::{Comparability, CustomType, NumericType, ValueType};
pub use value::{CustomValue, Value};
