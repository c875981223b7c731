use crate::{FieldKind, FieldMut, FieldRef, Result, Value};
use anyhow::bail;

/// Converter applied to a struct field when a row is read into it or when its
/// value is prepared for a statement.
///
/// A meddler is registered once under a name and shared by every record using it,
/// so it must be stateless or hold configuration only.
pub trait Meddler: Send + Sync {
    /// Check at metadata derivation time that the field shape is supported.
    fn validate(&self, _kind: &FieldKind) -> Result<()> {
        Ok(())
    }
    /// Produce the target the row scan will fill for this field.
    fn pre_read(&self, field: &dyn FieldRef) -> Result<ScanTarget>;
    /// Move the scanned value into the field.
    fn post_read(&self, field: &mut dyn FieldMut, target: ScanTarget) -> Result<()>;
    /// Convert the field into the value to bind in a statement.
    fn pre_write(&self, field: &dyn FieldRef) -> Result<Value>;
}

/// Destination of one column during a row scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanTarget {
    /// Typed slot, NULL is rejected.
    Value(Value),
    /// Typed slot accepting NULL.
    Nullable(Value),
    /// The column is read and thrown away.
    Discard,
}

impl ScanTarget {
    /// Store `value`, converting it to the type of the slot.
    pub fn scan(&mut self, value: Value) -> Result<()> {
        match self {
            ScanTarget::Value(slot) => {
                if value.is_null() {
                    bail!("Cannot scan NULL into a non nullable {:?}", slot);
                }
                *slot = value.cast(slot)?;
            }
            ScanTarget::Nullable(slot) => *slot = value.cast(slot)?,
            ScanTarget::Discard => {}
        }
        Ok(())
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            ScanTarget::Value(v) | ScanTarget::Nullable(v) => Some(v),
            ScanTarget::Discard => None,
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            ScanTarget::Value(v) | ScanTarget::Nullable(v) => v,
            ScanTarget::Discard => Value::Null,
        }
    }
}
