//! Containment in entity collections and membership in filter collections.

use std::sync::Arc;

use filterforge::prelude::*;
use filterforge::Configuration;
use filterforge_test::books::{book_shape, books};

fn criteria_shape() -> Arc<Shape> {
    Shape::builder("Criteria")
        .field("Tag", ValueType::String)
        .field("Years", ValueType::list(ValueType::I64))
        .build()
        .unwrap()
}

fn build(
    entity: &Arc<Shape>,
    filter: &Arc<Shape>,
    declare: impl FnOnce(&mut Configuration<'_>),
) -> FilterRegistry {
    let mut builder = FilterBuilder::new();
    let mut config = builder.configure(entity, filter).unwrap();
    declare(&mut config);
    config.finish().unwrap();
    builder.build()
}

fn names(predicate: &Predicate, entities: &[Record]) -> Vec<String> {
    predicate
        .select(entities)
        .filter_map(|book| book.field("Name").and_then(Value::as_str).map(str::to_string))
        .collect()
}

fn by_tag(filter: &Arc<Shape>, tag: &str) -> Record {
    filter
        .record([("Tag", Value::from(tag)), ("Years", Value::Null)])
        .unwrap()
}

fn by_years(filter: &Arc<Shape>, years: Option<Vec<i64>>) -> Record {
    filter
        .record([("Tag", Value::Null), ("Years", Value::from(years))])
        .unwrap()
}

#[test]
fn test_contains() {
    let (entity, filter) = (book_shape(), criteria_shape());
    let entities = books(&entity);
    let registry = build(&entity, &filter, |config| {
        config.contain(Contain::new("Tags", "Tag")).unwrap();
    });

    let predicate = registry.predicate(&entity, &by_tag(&filter, "scifi")).unwrap();
    assert_eq!(predicate.to_string(), "Tags.contains(\"scifi\")");
    assert_eq!(names(&predicate, &entities), vec!["Book 3", "Book 3"]);

    let predicate = registry.predicate(&entity, &by_tag(&filter, "classic")).unwrap();
    assert_eq!(names(&predicate, &entities), vec!["Book Test 1", "Book 3"]);
}

#[test]
fn test_not_contains_is_negation() {
    let (entity, filter) = (book_shape(), criteria_shape());
    let entities = books(&entity);
    let contains = build(&entity, &filter, |config| {
        config.contain(Contain::new("Tags", "Tag")).unwrap();
    });
    let not_contains = build(&entity, &filter, |config| {
        config
            .contain(Contain::new("Tags", "Tag").op(ContainOp::NotContains))
            .unwrap();
    });
    let reversed = build(&entity, &filter, |config| {
        config
            .contain(Contain::new("Tags", "Tag").reverse_if(|_| true))
            .unwrap();
    });

    for tag in ["classic", "scifi", "poetry", "none"] {
        let criteria = by_tag(&filter, tag);
        let yes = names(&contains.predicate(&entity, &criteria).unwrap(), &entities);
        let no = names(&not_contains.predicate(&entity, &criteria).unwrap(), &entities);
        let flipped = names(&reversed.predicate(&entity, &criteria).unwrap(), &entities);

        assert_eq!(yes.len() + no.len(), entities.len(), "{tag}");
        assert_eq!(flipped, no, "{tag}");
    }
}

#[test]
fn test_in_filter_collection() {
    let (entity, filter) = (book_shape(), criteria_shape());
    let entities = books(&entity);
    let registry = build(&entity, &filter, |config| {
        config.is_in(In::new("Year", "Years")).unwrap();
    });

    let predicate = registry
        .predicate(&entity, &by_years(&filter, Some(vec![2008, 2016])))
        .unwrap();
    assert_eq!(predicate.to_string(), "[2008, 2016].contains(i64(Year))");
    assert_eq!(
        names(&predicate, &entities),
        vec!["Book 2", "Book 3", "Test Book 5"]
    );

    // An empty collection matches nothing; an unset one is ignored.
    let predicate = registry
        .predicate(&entity, &by_years(&filter, Some(Vec::new())))
        .unwrap();
    assert!(names(&predicate, &entities).is_empty());
    let predicate = registry.predicate(&entity, &by_years(&filter, None)).unwrap();
    assert_eq!(names(&predicate, &entities).len(), 5);
}

#[test]
fn test_reversed_in_is_not_in() {
    let (entity, filter) = (book_shape(), criteria_shape());
    let entities = books(&entity);
    let not_in = build(&entity, &filter, |config| {
        config
            .is_in(In::new("Year", "Years").op(MembershipOp::NotIn))
            .unwrap();
    });
    let reversed = build(&entity, &filter, |config| {
        config
            .is_in(In::new("Year", "Years").reverse_if(|_| true))
            .unwrap();
    });

    for years in [vec![2008], vec![2000, 2012], vec![], vec![1999]] {
        let criteria = by_years(&filter, Some(years));
        let a = names(&not_in.predicate(&entity, &criteria).unwrap(), &entities);
        let b = names(&reversed.predicate(&entity, &criteria).unwrap(), &entities);
        assert_eq!(a, b);
    }

    let criteria = by_years(&filter, Some(vec![2008]));
    let predicate = not_in.predicate(&entity, &criteria).unwrap();
    assert_eq!(
        names(&predicate, &entities),
        vec!["Book Test 1", "Book 3", "Test Book 5"]
    );
}

#[test]
fn test_item_wider_than_element_is_rejected() {
    let entity = book_shape();
    let filter = Shape::builder("Narrow")
        .field("Years", ValueType::list(ValueType::I16))
        .build()
        .unwrap();
    let mut builder = FilterBuilder::new();
    let mut config = builder.configure(&entity, &filter).unwrap();
    let err = config.is_in(In::new("Year", "Years")).unwrap_err();
    assert!(matches!(err, FilterError::IncompatibleContainer { .. }), "{err}");
}
