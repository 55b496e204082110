//! String operators under both comparison modes.

use std::sync::Arc;

use filterforge::prelude::*;
use filterforge_test::books::{book_shape, books};
use rstest::rstest;

fn names(predicate: &Predicate, entities: &[Record]) -> Vec<String> {
    predicate
        .select(entities)
        .filter_map(|book| book.field("Name").and_then(Value::as_str).map(str::to_string))
        .collect()
}

fn select(text: Text, filter: &Arc<Shape>, criteria: Value) -> Vec<String> {
    let entity = book_shape();
    let mut builder = FilterBuilder::new();
    let mut config = builder.configure(&entity, filter).unwrap();
    config.text(text).unwrap();
    config.finish().unwrap();
    let registry = builder.build();

    let criteria = filter.record([("Name", criteria)]).unwrap();
    let predicate = registry.predicate(&entity, &criteria).unwrap();
    names(&predicate, &books(&entity))
}

const ALL: &[&str] = &["Book Test 1", "Book 2", "Book 3", "Book 3", "Test Book 5"];

fn by_name() -> Arc<Shape> {
    Shape::builder("ByName")
        .field("Name", ValueType::String)
        .build()
        .unwrap()
}

#[rstest]
#[case(StringOp::Equal, "book test 1", &["Book Test 1"], &[])]
#[case(StringOp::NotEqual, "BOOK 3", &["Book Test 1", "Book 2", "Test Book 5"], ALL)]
#[case(StringOp::Contains, "TEST", &["Book Test 1", "Test Book 5"], &[])]
#[case(StringOp::NotContains, "test", &["Book 2", "Book 3", "Book 3"], ALL)]
#[case(StringOp::StartsWith, "test", &["Test Book 5"], &[])]
#[case(StringOp::EndsWith, "BOOK 5", &["Test Book 5"], &[])]
#[case(StringOp::NotStartsWith, "book", &["Test Book 5"], ALL)]
fn test_case_modes(
    #[case] op: StringOp,
    #[case] pattern: &str,
    #[case] insensitive: &[&str],
    #[case] sensitive: &[&str],
) {
    let filter = by_name();
    assert_eq!(
        select(Text::new("Name", "Name").op(op).case_insensitive(), &filter, pattern.into()),
        insensitive,
        "{op} ignoring case"
    );
    assert_eq!(
        select(Text::new("Name", "Name").op(op), &filter, pattern.into()),
        sensitive,
        "{op}"
    );
}

#[test]
fn test_membership_in_string_list() {
    let filter = Shape::builder("ByNames")
        .field("Name", ValueType::list(ValueType::String))
        .build()
        .unwrap();
    let wanted = Value::from(vec!["book 2", "BOOK 3"]);

    assert_eq!(
        select(Text::new("Name", "Name").case_insensitive(), &filter, wanted.clone()),
        vec!["Book 2", "Book 3", "Book 3"]
    );
    assert!(select(Text::new("Name", "Name"), &filter, wanted.clone()).is_empty());
    assert_eq!(
        select(
            Text::new("Name", "Name").op(StringOp::NotIn).case_insensitive(),
            &filter,
            wanted
        ),
        vec!["Book Test 1", "Test Book 5"]
    );
}

#[test]
fn test_unset_pattern_is_ignored() {
    let filter = by_name();
    let all = select(Text::new("Name", "Name").op(StringOp::Contains), &filter, Value::Null);
    assert_eq!(all.len(), 5);
}

#[test]
fn test_reversed_text_matches_negated_operator() {
    let filter = by_name();
    for (op, negated) in [
        (StringOp::Equal, StringOp::NotEqual),
        (StringOp::Contains, StringOp::NotContains),
        (StringOp::StartsWith, StringOp::NotStartsWith),
        (StringOp::EndsWith, StringOp::NotEndsWith),
    ] {
        let reversed = select(
            Text::new("Name", "Name").op(op).reverse_if(|_| true),
            &filter,
            "Book".into(),
        );
        let direct = select(Text::new("Name", "Name").op(negated), &filter, "Book".into());
        assert_eq!(reversed, direct, "{op}");
    }
}
