use crate::{FieldKind, FieldMut, FieldRef, Meddler, Result, ScanTarget, Value};
use anyhow::bail;

/// Writes the zero value of numeric and text fields as NULL and reads NULL back as
/// zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroIsNull;

impl Meddler for ZeroIsNull {
    fn validate(&self, kind: &FieldKind) -> Result<()> {
        match kind {
            FieldKind::Scalar { nullable: true, .. } => {
                bail!("the field is already nullable")
            }
            FieldKind::Scalar { value, .. }
                if value.is_numeric() || matches!(value, Value::Varchar(..)) =>
            {
                Ok(())
            }
            _ => bail!("the field is neither numeric nor a string"),
        }
    }

    fn pre_read(&self, field: &dyn FieldRef) -> Result<ScanTarget> {
        match field.kind() {
            FieldKind::Scalar {
                value,
                nullable: false,
            } => Ok(ScanTarget::Nullable(value)),
            kind => bail!("ZeroIsNull cannot read into a {kind:?} field"),
        }
    }

    fn post_read(&self, field: &mut dyn FieldMut, target: ScanTarget) -> Result<()> {
        let value = target.into_value();
        if value.is_null() {
            return field.assign(value.as_zero());
        }
        field.assign(value)
    }

    fn pre_write(&self, field: &dyn FieldRef) -> Result<Value> {
        let value = field.value()?;
        if value.is_zero() {
            return Ok(value.as_null());
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn round_trip<T>(value: T) -> (Value, T)
    where
        T: crate::AsValue + Clone + Default + serde::Serialize + serde::de::DeserializeOwned,
    {
        let written = ZeroIsNull.pre_write(&crate::Scalar(&value)).unwrap();
        let mut field = T::default();
        let mut target = ZeroIsNull.pre_read(&crate::Scalar(&field)).unwrap();
        target.scan(written.clone()).unwrap();
        ZeroIsNull
            .post_read(&mut crate::Scalar(&mut field), target)
            .unwrap();
        (written, field)
    }

    #[test]
    fn zero_written_as_null() {
        assert_eq!(round_trip(0i32), (Value::Int32(None), 0));
        assert_eq!(round_trip(0u64), (Value::UInt64(None), 0));
        assert_eq!(round_trip(0.0f64), (Value::Float64(None), 0.0));
        assert_eq!(round_trip(String::new()), (Value::Varchar(None), String::new()));
        assert_eq!(round_trip(Decimal::ZERO), (Value::Decimal(None), Decimal::ZERO));
    }

    #[test]
    fn non_zero_preserved() {
        assert_eq!(round_trip(42i16), (Value::Int16(Some(42)), 42));
        assert_eq!(round_trip(-1.5f32), (Value::Float32(Some(-1.5)), -1.5));
        assert_eq!(
            round_trip(String::from("x")),
            (Value::Varchar(Some("x".into())), "x".to_string())
        );
    }

    #[test]
    fn null_reads_zero_over_previous_value() {
        let mut field = 99i64;
        let mut target = ZeroIsNull.pre_read(&crate::Scalar(&field)).unwrap();
        target.scan(Value::Null).unwrap();
        ZeroIsNull
            .post_read(&mut crate::Scalar(&mut field), target)
            .unwrap();
        assert_eq!(field, 0);
    }

    #[test]
    fn validate() {
        assert!(ZeroIsNull.validate(&FieldKind::scalar::<u8>()).is_ok());
        assert!(ZeroIsNull.validate(&FieldKind::scalar::<String>()).is_ok());
        assert!(ZeroIsNull.validate(&FieldKind::scalar::<Decimal>()).is_ok());
        assert!(ZeroIsNull.validate(&FieldKind::scalar::<Option<i32>>()).is_err());
        assert!(ZeroIsNull.validate(&FieldKind::scalar::<bool>()).is_err());
        assert!(ZeroIsNull.validate(&FieldKind::scalar::<time::OffsetDateTime>()).is_err());
        assert!(ZeroIsNull.validate(&FieldKind::Serialized).is_err());
    }
}
