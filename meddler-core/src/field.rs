use crate::{AsValue, Encoding, Error, Result, Value};
use serde::{Serialize, de::DeserializeOwned};
use std::any;

/// Shape of a struct field as seen by the meddlers.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Field converting to and from a single [`Value`]. `value` is the typed NULL
    /// of the field type.
    Scalar { value: Value, nullable: bool },
    /// Any other type, reachable only through its serde encoding.
    Serialized,
    /// Private or excluded field, never accessed.
    Unmapped,
}

impl FieldKind {
    pub fn scalar<T: AsValue>() -> Self {
        FieldKind::Scalar {
            value: T::as_empty_value(),
            nullable: T::nullable(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldKind::Scalar { nullable: true, .. })
    }

    /// Typed NULL of the field, `None` unless scalar.
    pub fn empty_value(&self) -> Option<&Value> {
        match self {
            FieldKind::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Declaration of one struct field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: &'static str,
    /// Raw `#[meddler("...")]` annotation.
    pub tag: Option<&'static str>,
    pub exported: bool,
    pub kind: FieldKind,
}

/// Read access to a struct field.
pub trait FieldRef {
    fn kind(&self) -> FieldKind;
    /// Current value, only for scalar fields.
    fn value(&self) -> Result<Value>;
    fn encode(&self, encoding: Encoding) -> Result<Vec<u8>>;
}

/// Write access to a struct field.
pub trait FieldMut: FieldRef {
    /// Replace the field with `value`, converting it to the field type.
    fn assign(&mut self, value: Value) -> Result<()>;
    /// Replace the field with the decoded `bytes`.
    fn decode(&mut self, encoding: Encoding, bytes: &[u8]) -> Result<()>;
}

/// Accessor for a field whose type implements [`AsValue`].
pub struct Scalar<R>(pub R);

/// Accessor for a field of any other serde type.
pub struct Serialized<R>(pub R);

macro_rules! impl_scalar_ref {
    ($reference:ty) => {
        impl<T> FieldRef for Scalar<$reference>
        where
            T: AsValue + Clone + Serialize + DeserializeOwned,
        {
            fn kind(&self) -> FieldKind {
                FieldKind::scalar::<T>()
            }
            fn value(&self) -> Result<Value> {
                Ok((*self.0).clone().as_value())
            }
            fn encode(&self, encoding: Encoding) -> Result<Vec<u8>> {
                encoding.encode(&*self.0)
            }
        }
    };
}
impl_scalar_ref!(&T);
impl_scalar_ref!(&mut T);

impl<T> FieldMut for Scalar<&mut T>
where
    T: AsValue + Clone + Serialize + DeserializeOwned,
{
    fn assign(&mut self, value: Value) -> Result<()> {
        *self.0 = T::try_from_value(value)?;
        Ok(())
    }
    fn decode(&mut self, encoding: Encoding, bytes: &[u8]) -> Result<()> {
        *self.0 = encoding.decode(bytes)?;
        Ok(())
    }
}

fn not_scalar<T>() -> Error {
    Error::msg(format!(
        "Field of type {} has no scalar value, it can only be handled by a serialization meddler",
        any::type_name::<T>()
    ))
}

macro_rules! impl_serialized_ref {
    ($reference:ty) => {
        impl<T> FieldRef for Serialized<$reference>
        where
            T: Serialize + DeserializeOwned,
        {
            fn kind(&self) -> FieldKind {
                FieldKind::Serialized
            }
            fn value(&self) -> Result<Value> {
                Err(not_scalar::<T>())
            }
            fn encode(&self, encoding: Encoding) -> Result<Vec<u8>> {
                encoding.encode(&*self.0)
            }
        }
    };
}
impl_serialized_ref!(&T);
impl_serialized_ref!(&mut T);

impl<T> FieldMut for Serialized<&mut T>
where
    T: Serialize + DeserializeOwned,
{
    fn assign(&mut self, _value: Value) -> Result<()> {
        Err(not_scalar::<T>())
    }
    fn decode(&mut self, encoding: Encoding, bytes: &[u8]) -> Result<()> {
        *self.0 = encoding.decode(bytes)?;
        Ok(())
    }
}

/// A struct that can be mapped to a row.
///
/// Usually derived with `#[derive(Record)]`. Field indexes follow [`Record::fields`],
/// the accessors return `None` for an index out of range or for an unmapped field.
///
/// ```rust
/// use meddler_core::{FieldDecl, FieldKind, FieldMut, FieldRef, Record, Scalar};
/// use std::sync::LazyLock;
///
/// #[derive(Default)]
/// struct Tag {
///     pub id: i64,
///     pub label: String,
/// }
///
/// impl Record for Tag {
///     fn fields() -> &'static [FieldDecl] {
///         static FIELDS: LazyLock<Vec<FieldDecl>> = LazyLock::new(|| {
///             vec![
///                 FieldDecl {
///                     name: "id",
///                     tag: Some("id,pk"),
///                     exported: true,
///                     kind: FieldKind::scalar::<i64>(),
///                 },
///                 FieldDecl {
///                     name: "label",
///                     tag: None,
///                     exported: true,
///                     kind: FieldKind::scalar::<String>(),
///                 },
///             ]
///         });
///         &FIELDS
///     }
///     fn with_field<R>(&self, index: usize, f: impl FnOnce(&dyn FieldRef) -> R) -> Option<R> {
///         match index {
///             0 => Some(f(&Scalar(&self.id))),
///             1 => Some(f(&Scalar(&self.label))),
///             _ => None,
///         }
///     }
///     fn with_field_mut<R>(
///         &mut self,
///         index: usize,
///         f: impl FnOnce(&mut dyn FieldMut) -> R,
///     ) -> Option<R> {
///         match index {
///             0 => Some(f(&mut Scalar(&mut self.id))),
///             1 => Some(f(&mut Scalar(&mut self.label))),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record: 'static {
    fn fields() -> &'static [FieldDecl];
    fn with_field<R>(&self, index: usize, f: impl FnOnce(&dyn FieldRef) -> R) -> Option<R>;
    fn with_field_mut<R>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut dyn FieldMut) -> R,
    ) -> Option<R>;
}
