//! FilterForge - compile filter criteria into reusable predicates
//!
//! Describe an entity shape and a filter shape, register the pair, and get a predicate
//! over entities for every filter instance. Same-named properties are bound
//! automatically; everything else is declared per pair.
//!
//! # Example
//!
//! ```rust
//! use filterforge::prelude::*;
//!
//! let book = Shape::builder("Book")
//!     .field("Name", ValueType::String)
//!     .field("Year", ValueType::I32)
//!     .build()
//!     .unwrap();
//! let filter = Shape::builder("BookFilter")
//!     .field("Name", ValueType::String)
//!     .field("From", ValueType::I32.or_null())
//!     .field("To", ValueType::I32.or_null())
//!     .build()
//!     .unwrap();
//!
//! let mut builder = FilterBuilder::new();
//! let mut config = builder.configure(&book, &filter).unwrap();
//! config
//!     .text(Text::new("Name", "Name").op(StringOp::StartsWith))
//!     .unwrap()
//!     .filter_range(FilterRange::new("From", "Year", "To").upper(RangeBound::Exclusive))
//!     .unwrap();
//! config.finish().unwrap();
//! let registry = builder.build();
//!
//! let criteria = filter
//!     .record([("Name", Value::from("Book")), ("From", Value::from(2005))])
//!     .unwrap();
//! let predicate = registry.predicate(&book, &criteria).unwrap();
//! assert_eq!(predicate.to_string(), "(Name.starts_with(\"Book\") && (Year >= 2005))");
//! ```

// Schema and values
pub use filterforge_core::{
    Comparability, CustomType, CustomValue, FieldDef, NumericType, Record, Shape, ShapeBuilder,
    ShapePair, Value, ValueType,
};

// Operators
pub use filterforge_core::{
    CompareOp, ContainOp, MembershipOp, RangeBound, StringComparison, StringOp,
};

// Errors
pub use filterforge_core::{FilterError, Result};

// Settings
pub use filterforge_config::{ConfigError, FilterSettings};

// Compiled artifacts and expressions
pub use filterforge_predicate::{BoolFn, CompiledFilter, Expr, ExprDisplay, Predicate};

// Registration
pub use filterforge_registry::{
    Compare, Configuration, Contain, Declaration, EntityRange, FilterBuilder, FilterRange,
    FilterRegistry, In, Raw, Text,
};

/// Colored console output for registration events.
#[cfg(feature = "console")]
pub use filterforge_console as console;

/// Lower-level building blocks for custom declarations and query translators.
pub mod internals {
    pub use filterforge_core::resolve;
    pub use filterforge_predicate::{
        binding, compile, eval_bool, Binding, BindingRules, EvalContext, PropertyRef,
    };
}

pub mod prelude {
    pub use super::{
        Compare, CompareOp, Contain, ContainOp, EntityRange, Expr, FilterBuilder, FilterError,
        FilterRange, FilterRegistry, FilterSettings, In, MembershipOp, Predicate, RangeBound, Raw,
        Record, Shape, StringComparison, StringOp, Text, Value, ValueType,
    };
}
