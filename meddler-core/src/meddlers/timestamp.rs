use crate::{FieldKind, FieldMut, FieldRef, Meddler, Result, ScanTarget, SchemaError, Value, ZERO_TIME};
use anyhow::bail;
use std::sync::OnceLock;
use time::UtcOffset;

static LOCAL_OFFSET: OnceLock<UtcOffset> = OnceLock::new();

/// Offset the local time meddlers convert to. Read from the operating system on
/// first use, UTC when it cannot be determined.
pub fn local_offset() -> UtcOffset {
    *LOCAL_OFFSET.get_or_init(|| UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
}

/// Fix the local offset. Must be called before the first use, returns the offset
/// in effect when it was already set.
pub fn set_local_offset(offset: UtcOffset) -> std::result::Result<(), UtcOffset> {
    LOCAL_OFFSET.set(offset).map_err(|_| local_offset())
}

/// Meddler for `OffsetDateTime` fields. Times are always written in UTC.
///
/// - `zero_is_null`: the zero time is written as NULL and NULL reads back as the
///   zero time.
/// - `local`: times read from the database are converted to [`local_offset`],
///   otherwise they are kept in UTC.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub zero_is_null: bool,
    pub local: bool,
}

impl Time {
    pub const LOCAL: Time = Time {
        zero_is_null: false,
        local: true,
    };
    pub const LOCAL_ZERO_IS_NULL: Time = Time {
        zero_is_null: true,
        local: true,
    };
    pub const UTC: Time = Time {
        zero_is_null: false,
        local: false,
    };
    pub const UTC_ZERO_IS_NULL: Time = Time {
        zero_is_null: true,
        local: false,
    };

    /// Name the configuration is registered under.
    pub fn name(&self) -> &'static str {
        match (self.zero_is_null, self.local) {
            (true, true) => "localtimez",
            (false, true) => "localtime",
            (true, false) => "utctimez",
            (false, false) => "utctime",
        }
    }

    fn offset(&self) -> UtcOffset {
        if self.local {
            local_offset()
        } else {
            UtcOffset::UTC
        }
    }
}

impl Meddler for Time {
    fn validate(&self, kind: &FieldKind) -> Result<()> {
        match kind {
            FieldKind::Scalar {
                value: Value::TimestampWithTimezone(..),
                ..
            } => Ok(()),
            _ => bail!("the field is not an OffsetDateTime"),
        }
    }

    fn pre_read(&self, field: &dyn FieldRef) -> Result<ScanTarget> {
        let kind = field.kind();
        if !matches!(
            kind,
            FieldKind::Scalar {
                value: Value::TimestampWithTimezone(..),
                ..
            }
        ) {
            bail!("Time meddler cannot read into a {kind:?} field");
        }
        if kind.is_nullable() {
            if self.zero_is_null {
                return Err(SchemaError::Unsupported {
                    field: String::new(),
                    meddler: self.name().into(),
                    reason: "zero is null cannot be combined with an Option field".into(),
                }
                .into());
            }
            return Ok(ScanTarget::Nullable(Value::TimestampWithTimezone(None)));
        }
        Ok(if self.zero_is_null {
            ScanTarget::Nullable(Value::TimestampWithTimezone(None))
        } else {
            ScanTarget::Value(Value::TimestampWithTimezone(None))
        })
    }

    fn post_read(&self, field: &mut dyn FieldMut, target: ScanTarget) -> Result<()> {
        let value = match target.into_value() {
            Value::TimestampWithTimezone(Some(v)) => {
                Value::TimestampWithTimezone(Some(v.to_offset(self.offset())))
            }
            v if v.is_null() && !field.kind().is_nullable() => {
                Value::TimestampWithTimezone(Some(ZERO_TIME))
            }
            v => v,
        };
        field.assign(value)
    }

    fn pre_write(&self, field: &dyn FieldRef) -> Result<Value> {
        let value = field.value()?;
        Ok(match value {
            Value::TimestampWithTimezone(Some(v)) if self.zero_is_null && v == ZERO_TIME => {
                Value::TimestampWithTimezone(None)
            }
            Value::TimestampWithTimezone(Some(v)) => {
                Value::TimestampWithTimezone(Some(v.to_offset(UtcOffset::UTC)))
            }
            Value::TimestampWithTimezone(None) => value,
            _ => bail!("Time meddler cannot write {value:?}"),
        })
    }
}
