//! FilterForge Registry - registration, auto-discovery and dispatch
//!
//! - [`declare`]: one declaration type per binding variant
//! - [`FilterBuilder`] and [`Configuration`]: per-pair binding accumulation, exclusions
//!   and auto-discovery of same-named properties
//! - [`FilterRegistry`]: the immutable, thread-safe result, with optional lazy and
//!   auto-register compilation
//!
//! # Example
//!
//! ```
//! use filterforge_core::{Shape, Value, ValueType};
//! use filterforge_registry::FilterBuilder;
//!
//! let book = Shape::builder("Book")
//!     .field("Name", ValueType::String)
//!     .field("Year", ValueType::I32)
//!     .build()
//!     .unwrap();
//! let filter = Shape::builder("BookFilter")
//!     .field("Name", ValueType::String)
//!     .field("Year", ValueType::I32.or_null())
//!     .build()
//!     .unwrap();
//!
//! let mut builder = FilterBuilder::new();
//! builder.register(&book, &filter).unwrap();
//! let registry = builder.build();
//!
//! let criteria = filter.record([("Year", 2008)]).unwrap();
//! let predicate = registry.predicate(&book, &criteria).unwrap();
//! assert!(predicate.matches(&book.record([("Name", Value::from("Book 2")), ("Year", Value::from(2008))]).unwrap()));
//! assert!(!predicate.matches(&book.record([("Name", Value::from("Book 3")), ("Year", Value::from(2012))]).unwrap()));
//! ```

#[cfg(test)]
mod tests;

pub mod builder;
pub mod declare;
mod discovery;
pub mod registry;

pub use builder::{Configuration, FilterBuilder};
pub use declare::{Compare, Contain, Declaration, EntityRange, FilterRange, In, Raw, Text};
pub use registry::FilterRegistry;
