//! Error types for FilterForge

use thiserror::Error;

/// Main error type for FilterForge operations.
///
/// Every variant except [`FilterError::NotRegistered`] is raised while bindings are
/// being configured. A failing call never commits a partial binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The shape pair already has a registration.
    #[error("filter for ({entity}, {filter}) is already registered")]
    DuplicateRegistration { entity: String, filter: String },

    /// The same property combination was bound twice within one registration.
    #[error("binding {binding} is declared twice for ({entity}, {filter})")]
    DuplicateBinding {
        entity: String,
        filter: String,
        binding: String,
    },

    /// The operator is not legal for the two property types.
    #[error(
        "operator {operator} cannot relate {entity_property}: {entity_type} \
         with {filter_property}: {filter_type} ({reason})"
    )]
    IncompatibleOperator {
        entity_property: String,
        entity_type: String,
        filter_property: String,
        filter_type: String,
        operator: String,
        reason: String,
    },

    /// Collection element type and item type cannot be matched.
    #[error(
        "collection {collection_property}: {collection_type} cannot hold \
         {item_property}: {item_type} ({reason})"
    )]
    IncompatibleContainer {
        collection_property: String,
        collection_type: String,
        item_property: String,
        item_type: String,
        reason: String,
    },

    /// A string binding was declared over a non-string property.
    #[error(
        "string operator {operator} needs string properties, got \
         {entity_property}: {entity_type} and {filter_property}: {filter_type}"
    )]
    InvalidStringBinding {
        entity_property: String,
        entity_type: String,
        filter_property: String,
        filter_type: String,
        operator: String,
    },

    /// A null-inclusion rule was given for an entity property that is never null.
    #[error("null inclusion is meaningless for {entity_property}: {entity_type}, which cannot be null")]
    UnnecessaryNullInclusion {
        entity_property: String,
        entity_type: String,
    },

    /// The registration produced no binding at all.
    #[error("no property of {entity} can be filtered by any property of {filter}")]
    NoUsableBinding { entity: String, filter: String },

    /// Properties matched by name, but their type has no usable equality relation.
    #[error(
        "registration of ({entity}, {filter}) is trivial: matching properties of type \
         {type_name} define no equality"
    )]
    TrivialRegistration {
        entity: String,
        filter: String,
        type_name: String,
    },

    /// A property was excluded twice, or both conditionally and unconditionally.
    #[error("property {shape}.{property} is already excluded")]
    DuplicateExclusion { shape: String, property: String },

    /// No compiled filter exists for the pair and auto-register mode is off.
    #[error("no filter registered for ({entity}, {filter})")]
    NotRegistered { entity: String, filter: String },

    /// A declaration referenced a property the shape does not have.
    #[error("shape {shape} has no property {property}")]
    UnknownProperty { shape: String, property: String },

    /// A shape definition is malformed.
    #[error("invalid shape {shape}: {reason}")]
    InvalidShape { shape: String, reason: String },

    /// A record does not fit its shape.
    #[error("invalid record for {shape}: {reason}")]
    InvalidRecord { shape: String, reason: String },
}

/// Result type alias for FilterForge operations
pub type Result<T> = std::result::Result<T, FilterError>;
