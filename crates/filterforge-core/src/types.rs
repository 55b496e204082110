//! Declared value types of shape properties.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Numeric representations taking part in implicit widening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
}

impl NumericType {
    pub fn is_integer(self) -> bool {
        !matches!(self, NumericType::F32 | NumericType::F64 | NumericType::Decimal)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            NumericType::I8 | NumericType::I16 | NumericType::I32 | NumericType::I64
        )
    }

    /// Bit width of an integer type. Zero for floating and decimal types.
    pub fn bits(self) -> u32 {
        match self {
            NumericType::I8 | NumericType::U8 => 8,
            NumericType::I16 | NumericType::U16 => 16,
            NumericType::I32 | NumericType::U32 => 32,
            NumericType::I64 | NumericType::U64 => 64,
            NumericType::F32 | NumericType::F64 | NumericType::Decimal => 0,
        }
    }

    /// Smallest signed integer type strictly wider than `bits`.
    pub(crate) fn signed_wider_than(bits: u32) -> Option<NumericType> {
        match bits {
            0..=7 => Some(NumericType::I8),
            8..=15 => Some(NumericType::I16),
            16..=31 => Some(NumericType::I32),
            32..=63 => Some(NumericType::I64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NumericType::I8 => "i8",
            NumericType::U8 => "u8",
            NumericType::I16 => "i16",
            NumericType::U16 => "u16",
            NumericType::I32 => "i32",
            NumericType::U32 => "u32",
            NumericType::I64 => "i64",
            NumericType::U64 => "u64",
            NumericType::F32 => "f32",
            NumericType::F64 => "f64",
            NumericType::Decimal => "decimal",
        }
    }
}

impl fmt::Display for NumericType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which relations a type defines.
///
/// `Ordered` implies `Equatable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Comparability {
    Opaque,
    Equatable,
    Ordered,
}

impl Comparability {
    pub fn has_equality(self) -> bool {
        self >= Comparability::Equatable
    }

    pub fn has_ordering(self) -> bool {
        self == Comparability::Ordered
    }
}

/// A caller-defined type whose values implement [`crate::CustomValue`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomType {
    pub name: Arc<str>,
    pub comparability: Comparability,
    /// Reference-like types may hold null without a `Nullable` wrapper.
    pub reference: bool,
}

impl CustomType {
    pub fn new(name: impl Into<Arc<str>>, comparability: Comparability) -> Self {
        Self {
            name: name.into(),
            comparability,
            reference: false,
        }
    }

    pub fn reference(name: impl Into<Arc<str>>, comparability: Comparability) -> Self {
        Self {
            name: name.into(),
            comparability,
            reference: true,
        }
    }
}

/// The declared type of a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Bool,
    Char,
    Numeric(NumericType),
    String,
    // Unix timestamp in milliseconds.
    DateTime,
    Enum(Arc<str>),
    Custom(CustomType),
    List(Box<ValueType>),
    Nullable(Box<ValueType>),
}

impl ValueType {
    pub const I8: ValueType = ValueType::Numeric(NumericType::I8);
    pub const U8: ValueType = ValueType::Numeric(NumericType::U8);
    pub const I16: ValueType = ValueType::Numeric(NumericType::I16);
    pub const U16: ValueType = ValueType::Numeric(NumericType::U16);
    pub const I32: ValueType = ValueType::Numeric(NumericType::I32);
    pub const U32: ValueType = ValueType::Numeric(NumericType::U32);
    pub const I64: ValueType = ValueType::Numeric(NumericType::I64);
    pub const U64: ValueType = ValueType::Numeric(NumericType::U64);
    pub const F32: ValueType = ValueType::Numeric(NumericType::F32);
    pub const F64: ValueType = ValueType::Numeric(NumericType::F64);
    pub const DECIMAL: ValueType = ValueType::Numeric(NumericType::Decimal);

    /// Wraps a type so it may hold null. Reference-like and already nullable
    /// types are returned unchanged.
    pub fn nullable(inner: ValueType) -> ValueType {
        if inner.can_be_null() {
            inner
        } else {
            ValueType::Nullable(Box::new(inner))
        }
    }

    pub fn list(element: ValueType) -> ValueType {
        ValueType::List(Box::new(element))
    }

    pub fn enumeration(name: impl Into<Arc<str>>) -> ValueType {
        ValueType::Enum(name.into())
    }

    /// Shorthand for `ValueType::nullable(self)`.
    pub fn or_null(self) -> ValueType {
        ValueType::nullable(self)
    }

    /// Strips one level of nullability.
    ///
    /// Returns the underlying type and whether the declared type may hold null.
    pub fn underlying(&self) -> (&ValueType, bool) {
        match self {
            ValueType::Nullable(inner) => (inner, true),
            other => (other, other.is_reference_like()),
        }
    }

    pub fn is_reference_like(&self) -> bool {
        match self {
            ValueType::String | ValueType::List(_) => true,
            ValueType::Custom(custom) => custom.reference,
            _ => false,
        }
    }

    pub fn can_be_null(&self) -> bool {
        matches!(self, ValueType::Nullable(_)) || self.is_reference_like()
    }

    pub fn is_string(&self) -> bool {
        matches!(self.underlying().0, ValueType::String)
    }

    pub fn as_numeric(&self) -> Option<NumericType> {
        match self.underlying().0 {
            ValueType::Numeric(n) => Some(*n),
            _ => None,
        }
    }

    /// Element type when the underlying type is a list.
    pub fn element(&self) -> Option<&ValueType> {
        match self.underlying().0 {
            ValueType::List(element) => Some(element),
            _ => None,
        }
    }

    /// Relations defined by the underlying type.
    pub fn comparability(&self) -> Comparability {
        match self.underlying().0 {
            ValueType::Numeric(_) | ValueType::Char | ValueType::DateTime | ValueType::Enum(_) => {
                Comparability::Ordered
            }
            ValueType::Bool | ValueType::String => Comparability::Equatable,
            ValueType::Custom(custom) => custom.comparability,
            ValueType::List(_) => Comparability::Opaque,
            ValueType::Nullable(inner) => inner.comparability(),
        }
    }

    /// Returns true if `value` is a legal value for this type.
    pub fn admits(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.can_be_null();
        }
        match (self.underlying().0, value) {
            (ValueType::Bool, Value::Bool(_)) => true,
            (ValueType::Char, Value::Char(_)) => true,
            (ValueType::Numeric(n), v) => v.numeric_type() == Some(*n),
            (ValueType::String, Value::String(_)) => true,
            (ValueType::DateTime, Value::DateTime(_)) => true,
            (ValueType::Enum(_), Value::Enum(_)) => true,
            (ValueType::Custom(custom), Value::Custom(v)) => v.type_name() == custom.name.as_ref(),
            (ValueType::List(element), Value::List(items)) => {
                items.iter().all(|item| element.admits(item))
            }
            _ => false,
        }
    }
}

impl From<NumericType> for ValueType {
    fn from(numeric: NumericType) -> Self {
        ValueType::Numeric(numeric)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => f.write_str("bool"),
            ValueType::Char => f.write_str("char"),
            ValueType::Numeric(n) => write!(f, "{n}"),
            ValueType::String => f.write_str("string"),
            ValueType::DateTime => f.write_str("datetime"),
            ValueType::Enum(name) => f.write_str(name),
            ValueType::Custom(custom) => f.write_str(&custom.name),
            ValueType::List(element) => write!(f, "list<{element}>"),
            ValueType::Nullable(inner) => write!(f, "{inner}?"),
        }
    }
}
