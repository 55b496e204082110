//! Book catalogue fixtures.
//!
//! # Example
//!
//! ```
//! use filterforge_test::books::{book_shape, books};
//!
//! let shape = book_shape();
//! let catalogue = books(&shape);
//! assert_eq!(catalogue.len(), 5);
//! ```

use std::sync::Arc;

use filterforge_core::{Record, Shape, Value, ValueType};

/// `Book { Name: string, Year: i32, Rating: f64?, Tags: list<string> }`.
pub fn book_shape() -> Arc<Shape> {
    Shape::builder("Book")
        .field("Name", ValueType::String)
        .field("Year", ValueType::I32)
        .field("Rating", ValueType::F64.or_null())
        .field("Tags", ValueType::list(ValueType::String))
        .build()
        .expect("book shape is well-formed")
}

/// `BookFilter { Name: string, Year: i32? }`.
pub fn book_filter_shape() -> Arc<Shape> {
    Shape::builder("BookFilter")
        .field("Name", ValueType::String)
        .field("Year", ValueType::I32.or_null())
        .build()
        .expect("book filter shape is well-formed")
}

/// Creates a book record.
pub fn book(shape: &Arc<Shape>, name: &str, year: i32, rating: Option<f64>, tags: &[&str]) -> Record {
    shape
        .record([
            ("Name", Value::from(name)),
            ("Year", Value::from(year)),
            ("Rating", Value::from(rating)),
            ("Tags", Value::from(tags.to_vec())),
        ])
        .expect("book record matches the book shape")
}

/// Creates a book filter record.
pub fn book_filter(shape: &Arc<Shape>, name: Option<&str>, year: Option<i32>) -> Record {
    shape
        .record([("Name", Value::from(name)), ("Year", Value::from(year))])
        .expect("filter record matches the book filter shape")
}

/// The five-book catalogue: two titles share the name "Book 3".
pub fn books(shape: &Arc<Shape>) -> Vec<Record> {
    vec![
        book(shape, "Book Test 1", 2000, Some(4.5), &["classic"]),
        book(shape, "Book 2", 2008, None, &[]),
        book(shape, "Book 3", 2008, Some(3.0), &["classic", "scifi"]),
        book(shape, "Book 3", 2012, Some(4.0), &["scifi"]),
        book(shape, "Test Book 5", 2016, None, &["poetry"]),
    ]
}
