//! Default ignore, null inclusion and reversal.

use filterforge::prelude::*;
use filterforge_test::numbers::{value_records, value_shape, values_of};
use rstest::rstest;

#[test]
fn test_null_filter_value_passes_everything() {
    let entity = value_shape("Number", ValueType::I32);
    let filter = value_shape("NumberFilter", ValueType::I32.or_null());
    let entities = value_records(&entity, 1..=5);

    let mut builder = FilterBuilder::new();
    builder.register(&entity, &filter).unwrap();
    let registry = builder.build();

    let unset = filter.record([("Value", Value::Null)]).unwrap();
    let predicate = registry.predicate(&entity, &unset).unwrap();
    assert_eq!(predicate.select(&entities).count(), 5);

    let set = filter.record([("Value", 3)]).unwrap();
    let predicate = registry.predicate(&entity, &set).unwrap();
    assert_eq!(values_of(predicate.select(&entities)), vec![Value::I32(3)]);
}

#[test]
fn test_explicit_ignore_replaces_default() {
    let entity = value_shape("Number", ValueType::I32.or_null());
    let filter = value_shape("NumberFilter", ValueType::I32.or_null());
    let entities = value_records(&entity, [Some(1), None, Some(3)]);

    let mut builder = FilterBuilder::new();
    let mut config = builder.configure(&entity, &filter).unwrap();
    config
        .compare(Compare::new("Value", "Value").ignore_if(|_| false))
        .unwrap();
    config.finish().unwrap();
    let registry = builder.build();

    // A null filter value is compared like any other: null == null.
    let unset = filter.record([("Value", Value::Null)]).unwrap();
    let predicate = registry.predicate(&entity, &unset).unwrap();
    assert_eq!(values_of(predicate.select(&entities)), vec![Value::Null]);
}

#[rstest]
#[case(None, false, vec![Some(1)])]
#[case(None, true, vec![None, Some(3)])]
#[case(Some(true), false, vec![Some(1), None])]
#[case(Some(true), true, vec![None, Some(3)])]
#[case(Some(false), false, vec![Some(1)])]
#[case(Some(false), true, vec![Some(3)])]
fn test_null_inclusion_and_reversal(
    #[case] include_null: Option<bool>,
    #[case] reverse: bool,
    #[case] expected: Vec<Option<i32>>,
) {
    let entity = value_shape("Number", ValueType::I32.or_null());
    let filter = value_shape("NumberFilter", ValueType::I32);
    let entities = value_records(&entity, [Some(1), None, Some(3)]);

    let mut declaration = Compare::new("Value", "Value").reverse_if(move |_| reverse);
    if let Some(include) = include_null {
        declaration = declaration.include_nulls(include);
    }
    let mut builder = FilterBuilder::new();
    let mut config = builder.configure(&entity, &filter).unwrap();
    config.compare(declaration).unwrap();
    config.finish().unwrap();
    let registry = builder.build();

    let criteria = filter.record([("Value", 1)]).unwrap();
    let predicate = registry.predicate(&entity, &criteria).unwrap();
    let expected: Vec<Value> = expected.into_iter().map(Value::from).collect();
    assert_eq!(values_of(predicate.select(&entities)), expected);
}

#[test]
fn test_null_inclusion_decided_per_filter() {
    let entity = value_shape("Number", ValueType::I32.or_null());
    let filter = Shape::builder("NumberFilter")
        .field("Value", ValueType::I32)
        .field("WithNulls", ValueType::Bool.or_null())
        .build()
        .unwrap();
    let entities = value_records(&entity, [Some(1), None, Some(3)]);

    let mut builder = FilterBuilder::new();
    let mut config = builder.configure(&entity, &filter).unwrap();
    config
        .compare(
            Compare::new("Value", "Value")
                .op(CompareOp::GreaterOrEqual)
                .include_null_if(|f| f.field("WithNulls").and_then(Value::as_bool)),
        )
        .unwrap();
    config.finish().unwrap();
    let registry = builder.build();

    let select = |with_nulls: Option<bool>| {
        let criteria = filter
            .record([("Value", Value::from(2)), ("WithNulls", Value::from(with_nulls))])
            .unwrap();
        let predicate = registry.predicate(&entity, &criteria).unwrap();
        values_of(predicate.select(&entities))
    };
    assert_eq!(select(Some(true)), vec![Value::Null, Value::I32(3)]);
    assert_eq!(select(Some(false)), vec![Value::I32(3)]);
    assert_eq!(select(None), vec![Value::I32(3)]);
}

#[rstest]
#[case(CompareOp::Equal)]
#[case(CompareOp::NotEqual)]
#[case(CompareOp::GreaterThan)]
#[case(CompareOp::GreaterOrEqual)]
#[case(CompareOp::LessThan)]
#[case(CompareOp::LessOrEqual)]
fn test_reversal_matches_inverse_operator(#[case] op: CompareOp) {
    let entity = value_shape("Number", ValueType::I64.or_null());
    let filter = value_shape("NumberFilter", ValueType::I16);
    let entities = value_records(&entity, [Some(-2i64), Some(0), None, Some(5), Some(9)]);

    let build = |declaration: Compare| {
        let mut builder = FilterBuilder::new();
        let mut config = builder.configure(&entity, &filter).unwrap();
        config.compare(declaration).unwrap();
        config.finish().unwrap();
        builder.build()
    };
    let reversed = build(Compare::new("Value", "Value").op(op).reverse_if(|_| true));
    let inverse = build(Compare::new("Value", "Value").op(op.inverse()));

    for value in [-2i16, 0, 5, 7] {
        let criteria = filter.record([("Value", value)]).unwrap();
        let a = reversed.predicate(&entity, &criteria).unwrap();
        let b = inverse.predicate(&entity, &criteria).unwrap();
        assert_eq!(
            values_of(a.select(&entities)),
            values_of(b.select(&entities)),
            "{op} reversed vs {}",
            op.inverse()
        );
    }
}
