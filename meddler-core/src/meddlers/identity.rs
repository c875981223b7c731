use crate::{FieldKind, FieldMut, FieldRef, Meddler, Result, ScanTarget, Value};
use anyhow::bail;

/// Passes values through unchanged. Default meddler of every field.
#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Meddler for Identity {
    fn validate(&self, kind: &FieldKind) -> Result<()> {
        if !matches!(kind, FieldKind::Scalar { .. }) {
            bail!("the field type does not convert to a single value, use a serialization meddler");
        }
        Ok(())
    }

    fn pre_read(&self, field: &dyn FieldRef) -> Result<ScanTarget> {
        match field.kind() {
            FieldKind::Scalar {
                value,
                nullable: false,
            } => Ok(ScanTarget::Value(value)),
            FieldKind::Scalar {
                value,
                nullable: true,
            } => Ok(ScanTarget::Nullable(value)),
            kind => bail!("Identity cannot read into a {kind:?} field"),
        }
    }

    fn post_read(&self, field: &mut dyn FieldMut, target: ScanTarget) -> Result<()> {
        field.assign(target.into_value())
    }

    fn pre_write(&self, field: &dyn FieldRef) -> Result<Value> {
        field.value()
    }
}
