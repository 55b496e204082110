//! Tests for compare bindings and the rules shared by every binding.

use filterforge_core::{FilterError, NumericType};
use rstest::rstest;
use rust_decimal::Decimal;

use super::*;

#[rstest]
#[case::i32_vs_decimal(ValueType::I32, ValueType::DECIMAL, Value::I32(-7), Value::Decimal(Decimal::from(-7)), CompareOp::Equal, true)]
#[case::i32_below_decimal(ValueType::I32, ValueType::DECIMAL, Value::I32(7), Value::Decimal(Decimal::new(705, 2)), CompareOp::LessThan, true)]
#[case::u64_max_vs_decimal(ValueType::U64, ValueType::DECIMAL, Value::U64(u64::MAX), Value::Decimal(Decimal::from(u64::MAX)), CompareOp::Equal, true)]
#[case::u64_max_above_decimal(ValueType::U64, ValueType::DECIMAL, Value::U64(u64::MAX), Value::Decimal(Decimal::from(u64::MAX - 1)), CompareOp::GreaterThan, true)]
#[case::i64_vs_f64(ValueType::I64, ValueType::F64, Value::I64(3), Value::F64(3.5), CompareOp::LessThan, true)]
#[case::i64_equal_f64(ValueType::I64, ValueType::F64, Value::I64(-3), Value::F64(-3.0), CompareOp::Equal, true)]
#[case::f32_vs_f64(ValueType::F32, ValueType::F64, Value::F32(1.5), Value::F64(1.5), CompareOp::Equal, true)]
#[case::f32_below_f64(ValueType::F32, ValueType::F64, Value::F32(-2.5), Value::F64(-2.25), CompareOp::GreaterOrEqual, false)]
#[case::negative_i8_vs_u8(ValueType::I8, ValueType::U8, Value::I8(-1), Value::U8(255), CompareOp::LessThan, true)]
#[case::negative_i8_not_u8(ValueType::I8, ValueType::U8, Value::I8(-1), Value::U8(255), CompareOp::Equal, false)]
#[case::i8_min_vs_u8(ValueType::I8, ValueType::U8, Value::I8(i8::MIN), Value::U8(0), CompareOp::NotEqual, true)]
fn test_widened_compare(
    #[case] entity_type: ValueType,
    #[case] filter_type: ValueType,
    #[case] entity_value: Value,
    #[case] criterion: Value,
    #[case] op: CompareOp,
    #[case] expected: bool,
) {
    let entity = value_shape("Reading", entity_type);
    let filter = value_shape("ReadingFilter", filter_type);
    let compiled = compile(
        &entity,
        &filter,
        &[compare_binding(&entity, &filter, op, BindingRules::default())],
    );
    let record = Record::new(Arc::clone(&entity), vec![entity_value]).unwrap();
    let criteria = filter_value(&filter, criterion);
    let predicate = compiled.predicate(&criteria).unwrap();

    assert_eq!(predicate.matches(&record), expected, "{predicate}");
    assert_eq!(compiled.matches(&criteria, &record).unwrap(), expected, "{predicate}");
}

#[test]
fn test_equal_compare() {
    let (entity, filter) = nullable_i32_pair();
    let compiled = compile(
        &entity,
        &filter,
        &[compare_binding(&entity, &filter, CompareOp::Equal, BindingRules::default())],
    );
    let entities = value_records(&entity, ints(&[Some(1), Some(2), Some(3)]));

    assert_eq!(compiled.binding_count(), 1);
    assert_eq!(
        select(&compiled, &filter_value(&filter, 2), &entities),
        ints(&[Some(2)])
    );
}

#[test]
fn test_default_ignore_on_null_filter() {
    let (entity, filter) = nullable_i32_pair();
    let compiled = compile(
        &entity,
        &filter,
        &[compare_binding(&entity, &filter, CompareOp::Equal, BindingRules::default())],
    );
    let entities = value_records(&entity, [1, 2, 3, 4, 5]);

    let filter = filter_value(&filter, Value::Null);
    assert_eq!(compiled.expr(&filter).unwrap(), Expr::bool(true));
    assert_eq!(select(&compiled, &filter, &entities).len(), 5);
}

#[test]
fn test_non_nullable_filter_is_never_ignored_by_default() {
    let entity = value_shape("Number", ValueType::I32.or_null());
    let filter = value_shape("Exact", ValueType::I32);
    let compiled = compile(
        &entity,
        &filter,
        &[compare_binding(&entity, &filter, CompareOp::Equal, BindingRules::default())],
    );
    let entities = value_records(&entity, ints(&[Some(0), None]));
    assert_eq!(
        select(&compiled, &filter_value(&filter, 0), &entities),
        ints(&[Some(0)])
    );
}

#[test]
fn test_include_null_and_reverse_combinations() {
    let (entity, filter_shape) = nullable_i32_pair();
    let entities = value_records(&entity, ints(&[Some(1), None, Some(3)]));
    let filter = filter_value(&filter_shape, 1);

    let cases = [
        (None, false, vec![Some(1)]),
        (None, true, vec![None, Some(3)]),
        (Some(true), false, vec![Some(1), None]),
        (Some(true), true, vec![None, Some(3)]),
        (Some(false), false, vec![Some(1)]),
        (Some(false), true, vec![Some(3)]),
    ];
    for (inclusion, reversed, expected) in cases {
        let rules = BindingRules {
            reverse_if: reversed.then(always),
            include_null_if: inclusion.map(|decision| include_null(Some(decision))),
            ..BindingRules::default()
        };
        let compiled = compile(
            &entity,
            &filter_shape,
            &[compare_binding(&entity, &filter_shape, CompareOp::Equal, rules)],
        );
        assert_eq!(
            select(&compiled, &filter, &entities),
            ints(&expected),
            "include_null={inclusion:?} reversed={reversed}"
        );
    }
}

#[test]
fn test_include_null_decided_per_filter() {
    let (entity, filter_shape) = nullable_i32_pair();
    let entities = value_records(&entity, ints(&[Some(1), None, Some(3)]));
    // Nulls are admitted only when the filter asks for values below 2.
    let rules = BindingRules {
        include_null_if: Some(Arc::new(|f: &Record| {
            f.get(0).as_i64().map(|v| v < 2)
        })),
        ..BindingRules::default()
    };
    let compiled = compile(
        &entity,
        &filter_shape,
        &[compare_binding(&entity, &filter_shape, CompareOp::LessOrEqual, rules)],
    );

    assert_eq!(
        select(&compiled, &filter_value(&filter_shape, 1), &entities),
        ints(&[Some(1), None])
    );
    assert_eq!(
        select(&compiled, &filter_value(&filter_shape, 3), &entities),
        ints(&[Some(1), Some(3)])
    );
}

#[test]
fn test_ignore_if_and_exclusions() {
    let (entity, filter_shape) = nullable_i32_pair();
    let entities = value_records(&entity, [1, 2, 3]);
    let rules = BindingRules {
        ignore_if: Some(cond(|f| f.get(0).as_i64() == Some(0))),
        exclusions: vec![cond(|f| f.get(0).as_i64() == Some(99))],
        ..BindingRules::default()
    };
    let compiled = compile(
        &entity,
        &filter_shape,
        &[compare_binding(&entity, &filter_shape, CompareOp::GreaterThan, rules)],
    );

    assert_eq!(select(&compiled, &filter_value(&filter_shape, 0), &entities).len(), 3);
    assert_eq!(select(&compiled, &filter_value(&filter_shape, 99), &entities).len(), 3);
    assert_eq!(
        select(&compiled, &filter_value(&filter_shape, 1), &entities),
        ints(&[Some(2), Some(3)])
    );
    // An explicit ignore rule replaces the default, so a null filter value is compared.
    assert!(select(&compiled, &filter_value(&filter_shape, Value::Null), &entities).is_empty());
}

#[test]
fn test_widening_filter_side() {
    let entity = value_shape("Wide", ValueType::I32);
    let filter = value_shape("Narrow", ValueType::U8.or_null());
    let binding = compare_binding(&entity, &filter, CompareOp::Equal, BindingRules::default());
    let compiled = compile(&entity, &filter, &[binding]);

    let expr = compiled.expr(&filter_value(&filter, Value::U8(7))).unwrap();
    assert_eq!(expr, Expr::eq(Expr::field(0), Expr::Literal(Value::I32(7))));

    let entities = value_records(&entity, [5, 7, 300]);
    assert_eq!(
        select(&compiled, &filter_value(&filter, Value::U8(7)), &entities),
        vec![Value::I32(7)]
    );
}

#[test]
fn test_widening_both_sides() {
    let entity = value_shape("Signed", ValueType::I32);
    let filter = value_shape("Unsigned", ValueType::U32);
    let binding = compare_binding(&entity, &filter, CompareOp::LessThan, BindingRules::default());
    let compiled = compile(&entity, &filter, &[binding]);

    let filter = filter_value(&filter, Value::U32(u32::MAX));
    let expr = compiled.expr(&filter).unwrap();
    assert_eq!(
        expr,
        Expr::lt(
            Expr::convert(Expr::field(0), NumericType::I64),
            Expr::Literal(Value::I64(i64::from(u32::MAX)))
        )
    );
    let entities = value_records(&entity, [-1, i32::MAX]);
    assert_eq!(select(&compiled, &filter, &entities).len(), 2);
}

#[test]
fn test_raw_binding() {
    let (entity, filter_shape) = nullable_i32_pair();
    let raw = Binding::Raw {
        label: "value or double".to_string(),
        expr: Expr::eq(Expr::field(0), Expr::filter_field(0))
            | Expr::eq(Expr::field(0), Expr::literal(4)),
        rules: BindingRules::default(),
    };
    let compiled = compile(&entity, &filter_shape, &[raw]);
    let entities = value_records(&entity, [1, 2, 3, 4]);

    assert_eq!(
        select(&compiled, &filter_value(&filter_shape, 2), &entities),
        ints(&[Some(2), Some(4)])
    );
    // Raw bindings carry no default ignore.
    assert_eq!(
        select(&compiled, &filter_value(&filter_shape, Value::Null), &entities),
        ints(&[Some(4)])
    );
    assert_eq!(compiled.labels().collect::<Vec<_>>(), vec!["raw value or double"]);
}

#[test]
fn test_bindings_are_conjoined() {
    let (entity, filter_shape) = nullable_i32_pair();
    let compiled = compile(
        &entity,
        &filter_shape,
        &[
            compare_binding(&entity, &filter_shape, CompareOp::GreaterOrEqual, BindingRules::default()),
            Binding::Raw {
                label: "below ten".to_string(),
                expr: Expr::lt(Expr::field(0), Expr::literal(10)),
                rules: BindingRules::default(),
            },
        ],
    );
    let entities = value_records(&entity, [2, 5, 9, 12]);
    let filter = filter_value(&filter_shape, 5);
    assert_eq!(select(&compiled, &filter, &entities), ints(&[Some(5), Some(9)]));
    assert_eq!(
        compiled.predicate(&filter).unwrap().to_string(),
        "((Value >= 5) && (Value < 10))"
    );
}

#[test]
fn test_predicate_views() {
    let (entity, filter_shape) = nullable_i32_pair();
    let compiled = compile(
        &entity,
        &filter_shape,
        &[compare_binding(&entity, &filter_shape, CompareOp::NotEqual, BindingRules::default())],
    );
    let predicate = compiled.predicate(&filter_value(&filter_shape, 3)).unwrap();
    let entities = value_records(&entity, [3, 4]);

    let f = predicate.as_fn();
    assert!(!f(&entities[0]));
    assert!(f(&entities[1]));

    drop(f);
    let owned = predicate.into_fn();
    assert!(owned(&entities[1]));
}

#[test]
fn test_wrong_filter_shape_rejected() {
    let (entity, filter_shape) = nullable_i32_pair();
    let compiled = compile(
        &entity,
        &filter_shape,
        &[compare_binding(&entity, &filter_shape, CompareOp::Equal, BindingRules::default())],
    );
    let stranger = filter_value(&entity, 1);
    assert!(matches!(
        compiled.predicate(&stranger),
        Err(FilterError::InvalidRecord { .. })
    ));
}
