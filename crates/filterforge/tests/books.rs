//! End-to-end scenarios over the book catalogue.

use filterforge::prelude::*;
use filterforge_test::books::{book_filter, book_filter_shape, book_shape, books};

fn names(predicate: &Predicate, entities: &[Record]) -> Vec<String> {
    predicate
        .select(entities)
        .filter_map(|book| book.field("Name").and_then(Value::as_str).map(str::to_string))
        .collect()
}

#[test]
fn test_auto_discovered_equal_bindings() {
    let (entity, filter) = (book_shape(), book_filter_shape());
    let entities = books(&entity);

    let mut builder = FilterBuilder::new();
    builder.register(&entity, &filter).unwrap();
    let registry = builder.build();

    let criteria = book_filter(&filter, Some("Book 3"), None);
    let predicate = registry.predicate(&entity, &criteria).unwrap();
    assert_eq!(names(&predicate, &entities), vec!["Book 3", "Book 3"]);

    let criteria = book_filter(&filter, Some("Book 3"), Some(2012));
    let predicate = registry.predicate(&entity, &criteria).unwrap();
    assert_eq!(names(&predicate, &entities), vec!["Book 3"]);
}

#[test]
fn test_both_views_agree() {
    let (entity, filter) = (book_shape(), book_filter_shape());
    let entities = books(&entity);
    let mut builder = FilterBuilder::new();
    let mut config = builder.configure(&entity, &filter).unwrap();
    config
        .compare(
            Compare::new("Year", "Year")
                .op(CompareOp::GreaterThan)
                .reverse_if(|f| f.field("Name").is_some_and(|n| !n.is_null())),
        )
        .unwrap();
    config.finish().unwrap();
    let registry = builder.build();
    let compiled = registry.get(&entity, &filter).unwrap();

    for criteria in [
        book_filter(&filter, None, Some(2008)),
        book_filter(&filter, Some("x"), Some(2008)),
        book_filter(&filter, None, None),
    ] {
        let predicate = compiled.predicate(&criteria).unwrap();
        let direct = predicate.as_fn();
        for book in &entities {
            let interpreted = compiled.matches(&criteria, book).unwrap();
            assert_eq!(predicate.matches(book), interpreted, "{predicate}");
            assert_eq!(direct(book), interpreted);
        }
    }
}

#[test]
fn test_re_registration_keeps_first() {
    let (entity, filter) = (book_shape(), book_filter_shape());
    let entities = books(&entity);
    let mut builder = FilterBuilder::new();
    builder.register(&entity, &filter).unwrap();

    assert!(matches!(
        builder.register(&entity, &filter),
        Err(FilterError::DuplicateRegistration { .. })
    ));

    let registry = builder.build();
    let predicate = registry
        .predicate(&entity, &book_filter(&filter, None, Some(2008)))
        .unwrap();
    assert_eq!(names(&predicate, &entities), vec!["Book 2", "Book 3"]);
}

#[test]
fn test_predicate_as_plain_function() {
    let (entity, filter) = (book_shape(), book_filter_shape());
    let entities = books(&entity);
    let mut builder = FilterBuilder::new();
    builder.register(&entity, &filter).unwrap();
    let registry = builder.build();

    let accepts = registry
        .predicate(&entity, &book_filter(&filter, Some("Test Book 5"), None))
        .unwrap()
        .into_fn();
    let count = entities.iter().filter(|&book| accepts(book)).count();
    assert_eq!(count, 1);
}

#[test]
fn test_settings_from_toml_enable_auto_register() {
    let settings = FilterSettings::from_toml_str(
        r#"
        auto_register = true
        string_comparison = "case_insensitive"
        default_string_op = "starts_with"
        "#,
    )
    .unwrap();
    let (entity, filter) = (book_shape(), book_filter_shape());
    let entities = books(&entity);
    let registry = FilterBuilder::with_settings(settings).build();

    let predicate = registry
        .predicate(&entity, &book_filter(&filter, Some("book"), None))
        .unwrap();
    assert_eq!(
        predicate.to_string(),
        "Name.starts_with(\"book\", ignore_case)"
    );
    assert_eq!(
        names(&predicate, &entities),
        vec!["Book Test 1", "Book 2", "Book 3", "Book 3"]
    );
}
