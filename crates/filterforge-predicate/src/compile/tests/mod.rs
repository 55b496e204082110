//! Tests for the predicate compiler.

mod test_compare;

use std::sync::Arc;

use filterforge_core::resolve::{resolve_comparison, resolve_containment};
use filterforge_core::{CompareOp, RangeBound, Record, Shape, Value, ValueType};
use filterforge_test::numbers::{range_record, range_shape, value_records, value_shape, values_of};

use super::*;
use crate::binding::{FilterCondition, NullInclusion, PropertyRef, RangeSide};

fn prop(shape: &Shape, name: &str) -> PropertyRef {
    PropertyRef::resolve(shape, name).unwrap()
}

fn cond(f: impl Fn(&Record) -> bool + Send + Sync + 'static) -> FilterCondition {
    Arc::new(f)
}

fn always() -> FilterCondition {
    cond(|_| true)
}

fn include_null(decision: Option<bool>) -> NullInclusion {
    Arc::new(move |_| decision)
}

/// `Value <op> filter.Value` over two single-field shapes.
fn compare_binding(
    entity: &Shape,
    filter: &Shape,
    op: CompareOp,
    rules: BindingRules,
) -> Binding {
    let (e, f) = (prop(entity, "Value"), prop(filter, "Value"));
    let plan = resolve_comparison(&e.value_type, &f.value_type, op).unwrap();
    Binding::Compare {
        entity: e,
        filter: f,
        op,
        plan,
        rules,
    }
}

fn filter_range_binding(
    entity: &Shape,
    filter: &Shape,
    lower: RangeBound,
    upper: RangeBound,
    rules: BindingRules,
) -> Binding {
    let e = prop(entity, "Value");
    let side = |name: &str, kind: RangeBound, op: CompareOp| {
        let bound = prop(filter, name);
        let plan = resolve_comparison(&e.value_type, &bound.value_type, op).unwrap();
        RangeSide { bound, kind, plan }
    };
    Binding::FilterRange {
        min: side("Min", lower, lower.lower_op()),
        max: side("Max", upper, upper.upper_op()),
        entity: e.clone(),
        rules,
    }
}

/// Entity `Value` fields accepted by the predicate, checked against the interpreter.
fn select(compiled: &CompiledFilter, filter: &Record, entities: &[Record]) -> Vec<Value> {
    let predicate = compiled.predicate(filter).unwrap();
    for entity in entities {
        assert_eq!(
            predicate.matches(entity),
            compiled.matches(filter, entity).unwrap(),
            "lowered predicate {predicate} disagrees with the interpreter"
        );
    }
    values_of(predicate.select(entities))
}

fn ints(values: &[Option<i32>]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

fn nullable_i32_pair() -> (Arc<Shape>, Arc<Shape>) {
    (
        value_shape("Number", ValueType::I32.or_null()),
        value_shape("NumberFilter", ValueType::I32.or_null()),
    )
}

fn filter_value(shape: &Arc<Shape>, value: impl Into<Value>) -> Record {
    Record::new(Arc::clone(shape), vec![value.into()]).unwrap()
}
