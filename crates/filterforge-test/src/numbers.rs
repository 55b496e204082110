//! Single-field numeric shapes.

use std::sync::Arc;

use filterforge_core::{Record, Shape, Value, ValueType};

/// A shape with one field, `Value`, of the given type.
pub fn value_shape(name: &str, value_type: ValueType) -> Arc<Shape> {
    Shape::builder(name)
        .field("Value", value_type)
        .build()
        .expect("single-field shape is well-formed")
}

/// A filter shape with `Min` and `Max` fields of the given type.
pub fn range_shape(name: &str, value_type: ValueType) -> Arc<Shape> {
    Shape::builder(name)
        .field("Min", value_type.clone())
        .field("Max", value_type)
        .build()
        .expect("range shape is well-formed")
}

/// One record per value, for a shape built by [`value_shape`].
pub fn value_records<I>(shape: &Arc<Shape>, values: I) -> Vec<Record>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    values
        .into_iter()
        .map(|v| {
            Record::new(Arc::clone(shape), vec![v.into()]).expect("value fits the value shape")
        })
        .collect()
}

/// A record of a shape built by [`range_shape`].
pub fn range_record(shape: &Arc<Shape>, min: impl Into<Value>, max: impl Into<Value>) -> Record {
    Record::new(Arc::clone(shape), vec![min.into(), max.into()]).expect("bounds fit the range shape")
}

/// Reads the `Value` field of each record.
pub fn values_of<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<Value> {
    records
        .into_iter()
        .map(|r| r.get(0).clone())
        .collect()
}
