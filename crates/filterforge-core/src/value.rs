//! Runtime values held by records.

use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::types::NumericType;

/// A value of a caller-defined type.
///
/// Equality and ordering are opt-in: the defaults report the relation as missing,
/// which the evaluator treats as "does not match".
pub trait CustomValue: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;

    fn equals(&self, _other: &dyn CustomValue) -> Option<bool> {
        None
    }

    fn compare(&self, _other: &dyn CustomValue) -> Option<Ordering> {
        None
    }
}

/// A value stored in a record.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    String(Arc<str>),
    /// Unix timestamp in milliseconds.
    DateTime(i64),
    /// Enum ordinal.
    Enum(i64),
    List(Vec<Value>),
    Custom(Arc<dyn CustomValue>),
}

macro_rules! with_number {
    ($value:expr, $n:ident => $body:expr) => {
        match $value {
            Value::I8($n) => Some($body),
            Value::U8($n) => Some($body),
            Value::I16($n) => Some($body),
            Value::U16($n) => Some($body),
            Value::I32($n) => Some($body),
            Value::U32($n) => Some($body),
            Value::I64($n) => Some($body),
            Value::U64($n) => Some($body),
            Value::F32($n) => Some($body),
            Value::F64($n) => Some($body),
            Value::Decimal($n) => Some($body),
            _ => None,
        }
    };
}

fn cast<N: ToPrimitive>(n: &N, integral: bool, to: NumericType) -> Option<Value> {
    Some(match to {
        NumericType::I8 => Value::I8(n.to_i8()?),
        NumericType::U8 => Value::U8(n.to_u8()?),
        NumericType::I16 => Value::I16(n.to_i16()?),
        NumericType::U16 => Value::U16(n.to_u16()?),
        NumericType::I32 => Value::I32(n.to_i32()?),
        NumericType::U32 => Value::U32(n.to_u32()?),
        NumericType::I64 => Value::I64(n.to_i64()?),
        NumericType::U64 => Value::U64(n.to_u64()?),
        NumericType::F32 => Value::F32(n.to_f32()?),
        NumericType::F64 => Value::F64(n.to_f64()?),
        NumericType::Decimal if integral => Value::Decimal(Decimal::from_i128(n.to_i128()?)?),
        NumericType::Decimal => Value::Decimal(Decimal::from_f64(n.to_f64()?)?),
    })
}

impl Value {
    pub fn custom(value: impl CustomValue + 'static) -> Self {
        Value::Custom(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn numeric_type(&self) -> Option<NumericType> {
        Some(match self {
            Value::I8(_) => NumericType::I8,
            Value::U8(_) => NumericType::U8,
            Value::I16(_) => NumericType::I16,
            Value::U16(_) => NumericType::U16,
            Value::I32(_) => NumericType::I32,
            Value::U32(_) => NumericType::U32,
            Value::I64(_) => NumericType::I64,
            Value::U64(_) => NumericType::U64,
            Value::F32(_) => NumericType::F32,
            Value::F64(_) => NumericType::F64,
            Value::Decimal(_) => NumericType::Decimal,
            _ => return None,
        })
    }

    /// Converts a numeric value to `to`.
    ///
    /// Null stays null. Non-numeric values and values that do not fit yield `None`.
    pub fn widen(&self, to: NumericType) -> Option<Value> {
        if self.is_null() {
            return Some(Value::Null);
        }
        let integral = self.numeric_type()?.is_integer();
        with_number!(self, n => cast(n, integral, to)).flatten()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer value that fits an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::F32(_) | Value::F64(_) | Value::Decimal(_) => None,
            Value::DateTime(v) | Value::Enum(v) => Some(*v),
            other => with_number!(other, n => n.to_i64()).flatten(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        with_number!(self, n => n.to_f64()).flatten()
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_custom<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Custom(v) => v.as_any().downcast_ref(),
            _ => None,
        }
    }

    /// Equality between two non-null values of the same kind.
    ///
    /// Returns `None` when the kinds differ or the type defines no equality.
    pub fn equals(&self, other: &Value) -> Option<bool> {
        Some(match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) => return a.equals(b.as_ref()),
            _ => return None,
        })
    }

    /// Ordering between two non-null values of the same kind.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
            (Value::I8(a), Value::I8(b)) => Some(a.cmp(b)),
            (Value::U8(a), Value::U8(b)) => Some(a.cmp(b)),
            (Value::I16(a), Value::I16(b)) => Some(a.cmp(b)),
            (Value::U16(a), Value::U16(b)) => Some(a.cmp(b)),
            (Value::I32(a), Value::I32(b)) => Some(a.cmp(b)),
            (Value::U32(a), Value::U32(b)) => Some(a.cmp(b)),
            (Value::I64(a), Value::I64(b)) => Some(a.cmp(b)),
            (Value::U64(a), Value::U64(b)) => Some(a.cmp(b)),
            (Value::F32(a), Value::F32(b)) => a.partial_cmp(b),
            (Value::F64(a), Value::F64(b)) => a.partial_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Enum(a), Value::Enum(b)) => Some(a.cmp(b)),
            (Value::Custom(a), Value::Custom(b)) => a.compare(b.as_ref()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Custom(a), Value::Custom(b)) if Arc::ptr_eq(a, b) => true,
            _ => self.equals(other).unwrap_or(false),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "'{v}'"),
            Value::String(v) => write!(f, "{v:?}"),
            Value::DateTime(ms) => write!(f, "datetime({ms})"),
            Value::Enum(ordinal) => write!(f, "#{ordinal}"),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Custom(v) => write!(f, "{v:?}"),
            other => match with_number!(other, n => n.to_string()) {
                Some(text) => f.write_str(&text),
                None => Ok(()),
            },
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    char => Char,
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    Arc<str> => String,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(Arc::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(Arc::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
