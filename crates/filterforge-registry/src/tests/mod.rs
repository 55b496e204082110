//! Tests for registration and dispatch.


use std::sync::Arc;

use filterforge_config::FilterSettings;
use filterforge_core::{FilterError, Record, Result, Shape, Value, ValueType};
use filterforge_predicate::{Binding, Predicate};
use filterforge_test::books::{book, book_filter, book_filter_shape, book_shape, books};

use super::*;

fn shape(name: &str, fields: &[(&str, ValueType)]) -> Arc<Shape> {
    fields
        .iter()
        .fold(Shape::builder(name), |builder, (field, ty)| {
            builder.field(*field, ty.clone())
        })
        .build()
        .unwrap()
}

/// Resolves a declaration against a shape pair with default settings.
fn resolve(declaration: impl Declaration, entity: &Shape, filter: &Shape) -> Result<Binding> {
    declaration.resolve(entity, filter, &FilterSettings::default())
}

/// Names of the books the predicate accepts.
fn names(predicate: &Predicate, entities: &[Record]) -> Vec<String> {
    predicate
        .select(entities)
        .filter_map(|book| book.field("Name").and_then(Value::as_str).map(str::to_string))
        .collect()
}
