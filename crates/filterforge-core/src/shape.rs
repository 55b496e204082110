//! Shape descriptors and the records they describe.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{FilterError, Result};
use crate::types::ValueType;
use crate::value::Value;

static NULL: Value = Value::Null;

/// A named, typed property of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: Arc<str>,
    pub value_type: ValueType,
}

impl FieldDef {
    pub fn new(name: impl Into<Arc<str>>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// A named record type with a fixed list of typed properties.
///
/// Shapes are identified by name; two shapes with the same name are treated
/// as the same shape by the registry.
#[derive(Debug, Clone)]
pub struct Shape {
    name: Arc<str>,
    fields: Vec<FieldDef>,
    field_indices: HashMap<Arc<str>, usize>,
}

impl Shape {
    /// Creates a shape, rejecting empty and duplicate field names.
    pub fn new(name: impl Into<Arc<str>>, fields: Vec<FieldDef>) -> Result<Arc<Self>> {
        let name = name.into();
        let mut field_indices = HashMap::with_capacity(fields.len());
        for (idx, field) in fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(FilterError::InvalidShape {
                    shape: name.to_string(),
                    reason: format!("field {idx} has an empty name"),
                });
            }
            if field_indices.insert(field.name.clone(), idx).is_some() {
                return Err(FilterError::InvalidShape {
                    shape: name.to_string(),
                    reason: format!("field {} is declared twice", field.name),
                });
            }
        }
        Ok(Arc::new(Self {
            name,
            fields,
            field_indices,
        }))
    }

    pub fn builder(name: impl Into<Arc<str>>) -> ShapeBuilder {
        ShapeBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_indices.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.field_index(name).map(|idx| &self.fields[idx])
    }

    /// Looks up a field, failing with [`FilterError::UnknownProperty`].
    pub fn require(&self, name: &str) -> Result<(usize, &FieldDef)> {
        self.field_index(name)
            .map(|idx| (idx, &self.fields[idx]))
            .ok_or_else(|| FilterError::UnknownProperty {
                shape: self.name.to_string(),
                property: name.to_string(),
            })
    }

    /// Builds a record from `(field, value)` pairs.
    ///
    /// Fields not mentioned are null. Unknown names and values the field type
    /// does not admit are rejected.
    pub fn record<K, V, I>(self: &Arc<Self>, values: I) -> Result<Record>
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut slots = vec![Value::Null; self.fields.len()];
        for (name, value) in values {
            let (idx, _) = self.require(name.as_ref()).map_err(|_| FilterError::InvalidRecord {
                shape: self.name.to_string(),
                reason: format!("unknown field {}", name.as_ref()),
            })?;
            slots[idx] = value.into();
        }
        Record::new(Arc::clone(self), slots)
    }
}

/// Fluent construction of a [`Shape`].
#[derive(Debug, Clone)]
pub struct ShapeBuilder {
    name: Arc<str>,
    fields: Vec<FieldDef>,
}

impl ShapeBuilder {
    pub fn field(mut self, name: impl Into<Arc<str>>, value_type: ValueType) -> Self {
        self.fields.push(FieldDef::new(name, value_type));
        self
    }

    pub fn build(self) -> Result<Arc<Shape>> {
        Shape::new(self.name, self.fields)
    }
}

/// An instance of a shape: one value per field, in field order.
#[derive(Debug, Clone)]
pub struct Record {
    shape: Arc<Shape>,
    values: Vec<Value>,
}

impl Record {
    /// Creates a record from positional values, checking each against its field type.
    pub fn new(shape: Arc<Shape>, values: Vec<Value>) -> Result<Self> {
        if values.len() != shape.fields.len() {
            return Err(FilterError::InvalidRecord {
                shape: shape.name.to_string(),
                reason: format!(
                    "expected {} values, got {}",
                    shape.fields.len(),
                    values.len()
                ),
            });
        }
        for (field, value) in shape.fields.iter().zip(&values) {
            if !field.value_type.admits(value) {
                return Err(FilterError::InvalidRecord {
                    shape: shape.name.to_string(),
                    reason: format!(
                        "field {}: {} does not admit {value}",
                        field.name, field.value_type
                    ),
                });
            }
        }
        Ok(Self { shape, values })
    }

    pub fn shape(&self) -> &Arc<Shape> {
        &self.shape
    }

    /// Value at a field index; null when the index is out of range.
    pub fn get(&self, idx: usize) -> &Value {
        self.values.get(idx).unwrap_or(&NULL)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.shape.field_index(name).map(|idx| &self.values[idx])
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// Identity of a registration: an entity shape name and a filter shape name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapePair {
    pub entity: Arc<str>,
    pub filter: Arc<str>,
}

impl ShapePair {
    pub fn new(entity: &Shape, filter: &Shape) -> Self {
        Self {
            entity: entity.name.clone(),
            filter: filter.name.clone(),
        }
    }
}

impl fmt::Display for ShapePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.entity, self.filter)
    }
}
