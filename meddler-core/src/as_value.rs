use crate::{Error, Result, Value};
use anyhow::Context;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::any;
use time::{OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// This is what a scalar struct field must implement to be handled by the built-in
/// meddlers. The driver side is lenient: `try_from_value` accepts the canonical
/// variant plus the usual alternate encodings (other integer widths with range
/// checks, text for timestamps and uuids, blobs for strings).
///
/// # Examples
/// ```rust
/// use meddler_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed NULL for this type. Used as the scan target of the column and to
    /// describe the field type in metadata.
    fn as_empty_value() -> Value;
    /// Convert into the owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
    /// Whether the type can represent NULL.
    fn nullable() -> bool {
        false
    }
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {value:?} to {}",
        any::type_name::<T>()
    ))
}

fn as_i128(value: &Value) -> Option<i128> {
    Some(match value {
        Value::Int8(Some(v)) => *v as _,
        Value::Int16(Some(v)) => *v as _,
        Value::Int32(Some(v)) => *v as _,
        Value::Int64(Some(v)) => *v as _,
        Value::UInt8(Some(v)) => *v as _,
        Value::UInt16(Some(v)) => *v as _,
        Value::UInt32(Some(v)) => *v as _,
        Value::UInt64(Some(v)) => *v as _,
        _ => return None,
    })
}

macro_rules! impl_as_value_integer {
    ($source:ty, $destination:path) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let $destination(Some(v)) = value {
                    return Ok(v as _);
                }
                if let Some(v) = as_i128(&value) {
                    return <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {v} is out of range for {}",
                            any::type_name::<Self>(),
                        ))
                    });
                }
                match value {
                    Value::Boolean(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) if v.fract().is_zero() => v
                        .to_i128()
                        .and_then(|v| <$source>::try_from(v).ok())
                        .ok_or_else(|| mismatch::<Self>(&Value::Decimal(Some(v)))),
                    Value::Varchar(Some(ref v)) => v.trim().parse::<$source>().with_context(|| {
                        format!("Cannot parse `{v}` as {}", any::type_name::<Self>())
                    }),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_integer!(i8, Value::Int8);
impl_as_value_integer!(i16, Value::Int16);
impl_as_value_integer!(i32, Value::Int32);
impl_as_value_integer!(i64, Value::Int64);
impl_as_value_integer!(isize, Value::Int64);
impl_as_value_integer!(u8, Value::UInt8);
impl_as_value_integer!(u16, Value::UInt16);
impl_as_value_integer!(u32, Value::UInt32);
impl_as_value_integer!(u64, Value::UInt64);
impl_as_value_integer!(usize, Value::UInt64);

macro_rules! impl_as_value_float {
    ($source:ty, $destination:path, $to:ident) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                if let Some(v) = as_i128(&value) {
                    return Ok(v as _);
                }
                match value {
                    Value::Float32(Some(v)) => Ok(v as _),
                    Value::Float64(Some(v)) => Ok(v as _),
                    Value::Decimal(Some(v)) => v.$to().ok_or_else(|| mismatch::<Self>(&value)),
                    Value::Varchar(Some(ref v)) => v.trim().parse::<$source>().with_context(|| {
                        format!("Cannot parse `{v}` as {}", any::type_name::<Self>())
                    }),
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_float!(f32, Value::Float32, to_f32);
impl_as_value_float!(f64, Value::Float64, to_f64);

impl AsValue for bool {
    fn as_empty_value() -> Value {
        Value::Boolean(None)
    }
    fn as_value(self) -> Value {
        Value::Boolean(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if let Some(v) = as_i128(&value) {
            return Ok(v != 0);
        }
        match value {
            Value::Boolean(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => match v.trim() {
                "true" | "TRUE" | "t" | "1" => Ok(true),
                "false" | "FALSE" | "f" | "0" => Ok(false),
                _ => Err(mismatch::<Self>(&value)),
            },
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if let Some(v) = as_i128(&value) {
            return Decimal::from_i128(v).ok_or_else(|| mismatch::<Self>(&value));
        }
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Float32(Some(v)) => Decimal::from_f32(v).ok_or_else(|| mismatch::<Self>(&value)),
            Value::Float64(Some(v)) => Decimal::from_f64(v).ok_or_else(|| mismatch::<Self>(&value)),
            Value::Varchar(Some(ref v)) => v
                .trim()
                .parse::<Decimal>()
                .with_context(|| format!("Cannot parse `{v}` as Decimal")),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for String {
    fn as_empty_value() -> Value {
        Value::Varchar(None)
    }
    fn as_value(self) -> Value {
        Value::Varchar(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(Some(v)) => Ok(v),
            Value::Blob(Some(v)) => {
                String::from_utf8(v.into_vec()).context("Blob is not valid UTF-8 text")
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Box<[u8]> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(Some(v)) => Ok(v),
            Value::Varchar(Some(v)) => Ok(v.into_bytes().into_boxed_slice()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Uuid {
    fn as_empty_value() -> Value {
        Value::Uuid(None)
    }
    fn as_value(self) -> Value {
        Value::Uuid(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Uuid(Some(v)) => Ok(v),
            Value::Varchar(Some(ref v)) => {
                Uuid::parse_str(v.trim()).with_context(|| format!("Cannot parse `{v}` as Uuid"))
            }
            Value::Blob(Some(ref v)) => {
                Uuid::from_slice(v).with_context(|| format!("Cannot convert {value:?} to Uuid"))
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

/// Text layout used by drivers that store timestamps as plain text.
const TIMESTAMP_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    time::macros::format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
    );

impl AsValue for PrimitiveDateTime {
    fn as_empty_value() -> Value {
        Value::Timestamp(None)
    }
    fn as_value(self) -> Value {
        Value::Timestamp(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(Some(v)) => Ok(v),
            Value::TimestampWithTimezone(Some(v)) => {
                let v = v.to_offset(time::UtcOffset::UTC);
                Ok(PrimitiveDateTime::new(v.date(), v.time()))
            }
            Value::Varchar(Some(ref v)) => PrimitiveDateTime::parse(v.trim(), TIMESTAMP_FORMAT)
                .with_context(|| format!("Cannot parse `{v}` as a timestamp")),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for OffsetDateTime {
    fn as_empty_value() -> Value {
        Value::TimestampWithTimezone(None)
    }
    fn as_value(self) -> Value {
        Value::TimestampWithTimezone(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::TimestampWithTimezone(Some(v)) => Ok(v),
            Value::Timestamp(Some(v)) => Ok(v.assume_utc()),
            Value::Varchar(Some(ref v)) => {
                let v = v.trim();
                OffsetDateTime::parse(v, &Rfc3339)
                    .or_else(|_| {
                        PrimitiveDateTime::parse(v, TIMESTAMP_FORMAT).map(|v| v.assume_utc())
                    })
                    .with_context(|| format!("Cannot parse `{v}` as a timestamp"))
            }
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
    fn nullable() -> bool {
        true
    }
}
