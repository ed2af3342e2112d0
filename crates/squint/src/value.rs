//! Bind values and the `Valuer` conversion trait.
//!
//! Every bind that leaves a [`Builder`](crate::Builder) is a [`Value`]. Scalars,
//! strings, timestamps, UUIDs and JSON documents convert through [`Valuer`],
//! which is also the extension point for user types that want to bind as a
//! single value instead of being expanded into columns.

use std::error::Error;

use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type, to_sql_checked};
use uuid::Uuid;

/// A single positional bind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Json(serde_json::Value),
    /// A list bind. Expands to `col IN ( ... )` when it shows up as a column
    /// value in a WHERE-style record or map.
    Array(Vec<Value>),
}

impl Value {
    /// Whether this is the zero value of its kind.
    ///
    /// Arrays and byte strings are never zero: an empty list is still a list.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(v) => !v,
            Value::Int(v) => *v == 0,
            Value::UInt(v) => *v == 0,
            // -0.0 has a sign bit set and is not the zero value.
            Value::Float(v) => v.to_bits() == 0,
            Value::Text(v) => v.is_empty(),
            Value::Bytes(_) => false,
            Value::Timestamp(v) => v.timestamp() == 0 && v.timestamp_subsec_nanos() == 0,
            Value::Uuid(v) => v.is_nil(),
            Value::Json(v) => v.is_null(),
            Value::Array(_) => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Converts a Rust value into a [`Value`] bind.
///
/// Implement this for domain types that should bind as one parameter (money,
/// enums stored as text, and so on). Types implementing `Valuer` are never
/// inspected for columns.
///
/// ```
/// use squint::{Value, Valuer};
///
/// struct Cents(i64);
///
/// impl Valuer for Cents {
///     fn value(&self) -> Value {
///         Value::Int(self.0)
///     }
/// }
///
/// assert_eq!(Cents(250).value(), Value::Int(250));
/// ```
pub trait Valuer {
    fn value(&self) -> Value;

    /// Whether the empty-value policy treats this as empty.
    ///
    /// Defaults to [`Value::is_zero`] on the bound value. An `Option` is
    /// empty only when it is `None`: `Some(0)` was set on purpose.
    fn is_zero(&self) -> bool {
        self.value().is_zero()
    }
}

macro_rules! impl_valuer {
    ($variant:ident as $conv:ty => $($t:ty),+ $(,)?) => {
        $(
            impl Valuer for $t {
                fn value(&self) -> Value {
                    Value::$variant(<$conv>::from(*self))
                }
            }
        )+
    };
}

impl_valuer!(Bool as bool => bool);
impl_valuer!(Int as i64 => i8, i16, i32, i64, u8, u16, u32);
impl_valuer!(UInt as u64 => u64);
impl_valuer!(Float as f64 => f32, f64);

impl Valuer for isize {
    fn value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl Valuer for usize {
    fn value(&self) -> Value {
        Value::UInt(*self as u64)
    }
}

impl Valuer for char {
    fn value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl Valuer for str {
    fn value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl Valuer for String {
    fn value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl Valuer for Value {
    fn value(&self) -> Value {
        self.clone()
    }
}

impl Valuer for DateTime<Utc> {
    fn value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl Valuer for NaiveDateTime {
    fn value(&self) -> Value {
        Value::Timestamp(self.and_utc())
    }
}

impl Valuer for Uuid {
    fn value(&self) -> Value {
        Value::Uuid(*self)
    }
}

impl Valuer for serde_json::Value {
    fn value(&self) -> Value {
        Value::Json(self.clone())
    }
}

impl Valuer for bytes::Bytes {
    fn value(&self) -> Value {
        Value::Bytes(self.to_vec())
    }
}

impl<T: Valuer> Valuer for Option<T> {
    fn value(&self) -> Value {
        match self {
            Some(v) => v.value(),
            None => Value::Null,
        }
    }
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

impl<T: Valuer> Valuer for [T] {
    fn value(&self) -> Value {
        Value::Array(self.iter().map(Valuer::value).collect())
    }
}

impl<T: Valuer, const N: usize> Valuer for [T; N] {
    fn value(&self) -> Value {
        self.as_slice().value()
    }
}

impl<T: Valuer> Valuer for Vec<T> {
    fn value(&self) -> Value {
        self.as_slice().value()
    }
}

impl<T: Valuer + ?Sized> Valuer for &T {
    fn value(&self) -> Value {
        (**self).value()
    }
    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

impl<T: Valuer + ?Sized> Valuer for Box<T> {
    fn value(&self) -> Value {
        (**self).value()
    }
    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

/// Binds any `Serialize` type as a JSON document.
///
/// A serialization failure binds `NULL` and logs a warning; building SQL never
/// fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Valuer for Json<T> {
    fn value(&self) -> Value {
        match serde_json::to_value(&self.0) {
            Ok(v) => Value::Json(v),
            Err(e) => {
                tracing::warn!(target: "squint.value", error = %e, "JSON bind failed to serialize; binding NULL");
                Value::Null
            }
        }
    }
}

macro_rules! impl_from_for_value {
    ($($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    v.value()
                }
            }
        )+
    };
}

impl_from_for_value!(
    bool,
    i8,
    i16,
    i32,
    i64,
    isize,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    char,
    &str,
    String,
    DateTime<Utc>,
    NaiveDateTime,
    Uuid,
    serde_json::Value,
    bytes::Bytes,
);

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Valuer> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.value()
    }
}

fn int_to_sql(
    v: i64,
    ty: &Type,
    out: &mut BytesMut,
) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
    if *ty == Type::INT2 {
        i16::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(v)?.to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        (v as f32).to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        (v as f64).to_sql(ty, out)
    } else {
        v.to_sql(ty, out)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::Int(v) => int_to_sql(*v, ty, out),
            Value::UInt(v) => int_to_sql(i64::try_from(*v)?, ty, out),
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    (*v as f32).to_sql(ty, out)
                } else {
                    v.to_sql(ty, out)
                }
            }
            Value::Text(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
            Value::Uuid(v) => v.to_sql(ty, out),
            Value::Json(v) => v.to_sql(ty, out),
            Value::Array(v) => match ty.kind() {
                Kind::Array(_) => v.to_sql(ty, out),
                _ => Err(format!("cannot bind a list to non-array type {ty}").into()),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
