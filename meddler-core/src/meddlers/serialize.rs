use crate::{Encoding, FieldMut, FieldRef, Meddler, Result, ScanTarget, Value, compress, decompress};
use anyhow::{Context, bail};

/// Stores the field as the serde encoding of its value, optionally gzipped.
///
/// Works with any field, the column is read as bytes (text is accepted) and NULL
/// cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serde {
    pub encoding: Encoding,
    pub compress: bool,
}

impl Serde {
    pub const JSON: Serde = Serde {
        encoding: Encoding::Json,
        compress: false,
    };
    pub const JSON_GZIP: Serde = Serde {
        encoding: Encoding::Json,
        compress: true,
    };
    pub const BINCODE: Serde = Serde {
        encoding: Encoding::Bincode,
        compress: false,
    };
    pub const BINCODE_GZIP: Serde = Serde {
        encoding: Encoding::Bincode,
        compress: true,
    };
}

impl Meddler for Serde {
    fn pre_read(&self, _field: &dyn FieldRef) -> Result<ScanTarget> {
        Ok(ScanTarget::Nullable(Value::Blob(None)))
    }

    fn post_read(&self, field: &mut dyn FieldMut, target: ScanTarget) -> Result<()> {
        let bytes = match target.into_value() {
            Value::Blob(Some(v)) => v,
            v if v.is_null() => bail!("Cannot decode NULL as {}", self.encoding),
            v => bail!("Cannot decode {v:?} as {}", self.encoding),
        };
        let bytes = if self.compress {
            decompress(&bytes)?
        } else {
            bytes.into_vec()
        };
        field.decode(self.encoding, &bytes)
    }

    fn pre_write(&self, field: &dyn FieldRef) -> Result<Value> {
        let mut bytes = field
            .encode(self.encoding)
            .with_context(|| format!("While encoding the field as {}", self.encoding))?;
        if self.compress {
            bytes = compress(&bytes)?;
        }
        Ok(Value::Blob(Some(bytes.into_boxed_slice())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Scalar, Serialized};
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Payload {
        values: Vec<u32>,
        label: Option<String>,
    }

    fn round_trip(meddler: Serde, stored: impl FnOnce(Value) -> Value) -> Payload {
        let payload = Payload {
            values: vec![1, 2, 3],
            label: Some("three".into()),
        };
        let written = meddler.pre_write(&Serialized(&payload)).unwrap();
        let mut field = Payload {
            values: vec![9; 10],
            label: None,
        };
        let mut target = meddler.pre_read(&Serialized(&field)).unwrap();
        target.scan(stored(written)).unwrap();
        meddler
            .post_read(&mut Serialized(&mut field), target)
            .unwrap();
        field
    }

    #[test]
    fn all_encodings() {
        let expected = Payload {
            values: vec![1, 2, 3],
            label: Some("three".into()),
        };
        for meddler in [Serde::JSON, Serde::JSON_GZIP, Serde::BINCODE, Serde::BINCODE_GZIP] {
            assert_eq!(round_trip(meddler, |v| v), expected, "{meddler:?}");
        }
    }

    #[test]
    fn json_text_column() {
        let field = round_trip(Serde::JSON, |v| {
            let Value::Blob(Some(bytes)) = v else {
                panic!("expected bytes")
            };
            Value::Varchar(Some(String::from_utf8(bytes.into_vec()).unwrap()))
        });
        assert_eq!(field.values, [1, 2, 3]);
    }

    #[test]
    fn json_written_bytes() {
        let map = HashMap::from([("a".to_string(), true)]);
        assert_eq!(
            Serde::JSON.pre_write(&Serialized(&map)).unwrap(),
            Value::Blob(Some(br#"{"a":true}"#.to_vec().into()))
        );
        let count = 7i32;
        assert_eq!(
            Serde::JSON.pre_write(&Scalar(&count)).unwrap(),
            Value::Blob(Some(b"7".to_vec().into()))
        );
    }

    #[test]
    fn null_fails() {
        let mut field = Payload::default();
        let mut target = Serde::JSON.pre_read(&Serialized(&field)).unwrap();
        target.scan(Value::Null).unwrap();
        assert!(
            Serde::JSON
                .post_read(&mut Serialized(&mut field), target)
                .is_err()
        );
    }

    #[test]
    fn corrupted_compressed() {
        let mut field = Payload::default();
        let target = ScanTarget::Nullable(Value::Blob(Some(b"{}".to_vec().into())));
        assert!(
            Serde::JSON_GZIP
                .post_read(&mut Serialized(&mut field), target)
                .is_err()
        );
    }
}
