use crate::{AsValue, Error, Result};
use rust_decimal::Decimal;
use std::mem;
use time::{OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;

/// The instant used as the zero value of timestamps.
pub const ZERO_TIME: OffsetDateTime = OffsetDateTime::UNIX_EPOCH;

/// Dynamically typed value exchanged with the database driver.
///
/// Every typed variant carries an `Option`: `None` is a NULL that still knows its
/// type. `Value::Null` is the untyped NULL.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

/// Expands `$body` once per typed variant, binding the inner `Option` to `$v`.
macro_rules! for_each_variant {
    ($value:expr, $v:ident => $body:expr, Null => $null:expr) => {
        match $value {
            Value::Null => $null,
            Value::Boolean($v) => $body,
            Value::Int8($v) => $body,
            Value::Int16($v) => $body,
            Value::Int32($v) => $body,
            Value::Int64($v) => $body,
            Value::UInt8($v) => $body,
            Value::UInt16($v) => $body,
            Value::UInt32($v) => $body,
            Value::UInt64($v) => $body,
            Value::Float32($v) => $body,
            Value::Float64($v) => $body,
            Value::Decimal($v) => $body,
            Value::Varchar($v) => $body,
            Value::Blob($v) => $body,
            Value::Timestamp($v) => $body,
            Value::TimestampWithTimezone($v) => $body,
            Value::Uuid($v) => $body,
        }
    };
}

impl Value {
    pub fn is_null(&self) -> bool {
        for_each_variant!(self, v => v.is_none(), Null => true)
    }

    pub fn same_type(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }

    /// True when the value holds the zero value of its type: `0`, `""`, `false`, an
    /// empty blob, the nil uuid or [`ZERO_TIME`]. NULL is not zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Boolean(Some(v)) => !v,
            Value::Int8(Some(v)) => *v == 0,
            Value::Int16(Some(v)) => *v == 0,
            Value::Int32(Some(v)) => *v == 0,
            Value::Int64(Some(v)) => *v == 0,
            Value::UInt8(Some(v)) => *v == 0,
            Value::UInt16(Some(v)) => *v == 0,
            Value::UInt32(Some(v)) => *v == 0,
            Value::UInt64(Some(v)) => *v == 0,
            Value::Float32(Some(v)) => *v == 0.0,
            Value::Float64(Some(v)) => *v == 0.0,
            Value::Decimal(Some(v)) => v.is_zero(),
            Value::Varchar(Some(v)) => v.is_empty(),
            Value::Blob(Some(v)) => v.is_empty(),
            Value::Timestamp(Some(v)) => v.assume_utc() == ZERO_TIME,
            Value::TimestampWithTimezone(Some(v)) => *v == ZERO_TIME,
            Value::Uuid(Some(v)) => v.is_nil(),
            _ => false,
        }
    }

    /// Typed NULL of the same type.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int8(..) => Value::Int8(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::UInt8(..) => Value::UInt8(None),
            Value::UInt16(..) => Value::UInt16(None),
            Value::UInt32(..) => Value::UInt32(None),
            Value::UInt64(..) => Value::UInt64(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(None),
            Value::Uuid(..) => Value::Uuid(None),
        }
    }

    /// Zero value of the same type. The untyped NULL stays NULL.
    pub fn as_zero(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(Some(false)),
            Value::Int8(..) => Value::Int8(Some(0)),
            Value::Int16(..) => Value::Int16(Some(0)),
            Value::Int32(..) => Value::Int32(Some(0)),
            Value::Int64(..) => Value::Int64(Some(0)),
            Value::UInt8(..) => Value::UInt8(Some(0)),
            Value::UInt16(..) => Value::UInt16(Some(0)),
            Value::UInt32(..) => Value::UInt32(Some(0)),
            Value::UInt64(..) => Value::UInt64(Some(0)),
            Value::Float32(..) => Value::Float32(Some(0.0)),
            Value::Float64(..) => Value::Float64(Some(0.0)),
            Value::Decimal(..) => Value::Decimal(Some(Decimal::ZERO)),
            Value::Varchar(..) => Value::Varchar(Some(String::new())),
            Value::Blob(..) => Value::Blob(Some(Box::default())),
            Value::Timestamp(..) => Value::Timestamp(Some(PrimitiveDateTime::new(
                ZERO_TIME.date(),
                ZERO_TIME.time(),
            ))),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(Some(ZERO_TIME)),
            Value::Uuid(..) => Value::Uuid(Some(Uuid::nil())),
        }
    }

    pub fn is_signed_integer(&self) -> bool {
        matches!(
            self,
            Value::Int8(..) | Value::Int16(..) | Value::Int32(..) | Value::Int64(..)
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int8(..)
                | Value::Int16(..)
                | Value::Int32(..)
                | Value::Int64(..)
                | Value::UInt8(..)
                | Value::UInt16(..)
                | Value::UInt32(..)
                | Value::UInt64(..)
                | Value::Float32(..)
                | Value::Float64(..)
                | Value::Decimal(..)
        )
    }

    /// Converts a value produced by the driver into the type of `like`.
    ///
    /// NULL of any kind becomes the typed NULL of `like`. An untyped `like` accepts the
    /// value as it is.
    pub fn cast(self, like: &Value) -> Result<Value> {
        if self.is_null() {
            return Ok(like.as_null());
        }
        macro_rules! cast {
            ($variant:path, $ty:ty) => {
                $variant(Some(<$ty as AsValue>::try_from_value(self)?))
            };
        }
        Ok(match like {
            Value::Null => self,
            Value::Boolean(..) => cast!(Value::Boolean, bool),
            Value::Int8(..) => cast!(Value::Int8, i8),
            Value::Int16(..) => cast!(Value::Int16, i16),
            Value::Int32(..) => cast!(Value::Int32, i32),
            Value::Int64(..) => cast!(Value::Int64, i64),
            Value::UInt8(..) => cast!(Value::UInt8, u8),
            Value::UInt16(..) => cast!(Value::UInt16, u16),
            Value::UInt32(..) => cast!(Value::UInt32, u32),
            Value::UInt64(..) => cast!(Value::UInt64, u64),
            Value::Float32(..) => cast!(Value::Float32, f32),
            Value::Float64(..) => cast!(Value::Float64, f64),
            Value::Decimal(..) => cast!(Value::Decimal, Decimal),
            Value::Varchar(..) => cast!(Value::Varchar, String),
            Value::Blob(..) => cast!(Value::Blob, Box<[u8]>),
            Value::Timestamp(..) => cast!(Value::Timestamp, PrimitiveDateTime),
            Value::TimestampWithTimezone(..) => {
                cast!(Value::TimestampWithTimezone, OffsetDateTime)
            }
            Value::Uuid(..) => cast!(Value::Uuid, Uuid),
        })
    }

    /// Reads an integer value of any width as `i64`.
    pub fn to_i64(&self) -> Result<i64> {
        match self {
            Value::Int8(Some(v)) => Ok(*v as i64),
            Value::Int16(Some(v)) => Ok(*v as i64),
            Value::Int32(Some(v)) => Ok(*v as i64),
            Value::Int64(Some(v)) => Ok(*v),
            Value::UInt8(Some(v)) => Ok(*v as i64),
            Value::UInt16(Some(v)) => Ok(*v as i64),
            Value::UInt32(Some(v)) => Ok(*v as i64),
            Value::UInt64(Some(v)) => i64::try_from(*v)
                .map_err(|_| Error::msg(format!("Value {v}: u64 is out of range for i64"))),
            _ => Err(Error::msg(format!("Cannot read {self:?} as an integer"))),
        }
    }
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}
