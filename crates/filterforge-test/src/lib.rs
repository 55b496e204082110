//! Shared test fixtures for FilterForge crates.
//!
//! This crate provides shapes, records and custom value types for testing.
//! It depends only on `filterforge-core` so every other crate can use it.
//!
//! - [`books`] - the book catalogue used by the end-to-end scenarios
//! - [`numbers`] - single-field numeric shapes for widening and range tests
//! - [`custom`] - caller-defined value types with and without relations
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! filterforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use filterforge_test::books::{book_filter_shape, book_shape, books};
//! use filterforge_test::custom::Money;
//! ```

pub mod books;
pub mod custom;
pub mod numbers;

pub use books::{book_filter_shape, book_shape, books};
pub use custom::{Blob, Money};
pub use numbers::{value_records, value_shape};
