use crate::Result;
use anyhow::{Context, bail};
use bincode::{
    config::standard,
    serde::{decode_from_slice, encode_to_vec},
};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    fmt::{self, Display, Formatter},
    io::{Read, Write},
};

/// Byte encoding used by the serialization meddlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// JSON text (`serde_json`).
    Json,
    /// Compact binary encoding (`bincode`, standard configuration).
    Bincode,
}

impl Encoding {
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        match self {
            Encoding::Json => serde_json::to_vec(value).context("Failed to encode as json"),
            Encoding::Bincode => {
                encode_to_vec(value, standard()).context("Failed to encode as bincode")
            }
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        match self {
            Encoding::Json => serde_json::from_slice(bytes).context("Failed to decode json"),
            Encoding::Bincode => decode_from_slice(bytes, standard())
                .map(|(v, _)| v)
                .context("Failed to decode bincode"),
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Json => "json",
            Encoding::Bincode => "bincode",
        })
    }
}

pub fn compress(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2 + 64), Compression::default());
    encoder.write_all(bytes).context("Failed to compress")?;
    encoder.finish().context("Failed to compress")
}

/// Largest payload [`decompress`] inflates, larger ones are rejected.
pub const MAX_DECOMPRESSED_LEN: u64 = 64 * 1024 * 1024;

pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>> {
    decompress_at_most(bytes, MAX_DECOMPRESSED_LEN)
}

fn decompress_at_most(bytes: &[u8], limit: u64) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(bytes.len() * 2);
    GzDecoder::new(bytes)
        .take(limit + 1)
        .read_to_end(&mut result)
        .context("Failed to decompress")?;
    if result.len() as u64 > limit {
        bail!("Decompressed data exceeds {limit} bytes");
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn json() {
        let value = BTreeMap::from([("a", 1), ("b", 2)]);
        let bytes = Encoding::Json.encode(&value).unwrap();
        assert_eq!(bytes, br#"{"a":1,"b":2}"#);
        let decoded: BTreeMap<String, i32> = Encoding::Json.decode(&bytes).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded["b"], 2);
        assert!(Encoding::Json.decode::<Vec<i32>>(b"{").is_err());
    }

    #[test]
    fn bincode() {
        let value = (7u32, String::from("seven"), vec![true, false]);
        let bytes = Encoding::Bincode.encode(&value).unwrap();
        let decoded: (u32, String, Vec<bool>) = Encoding::Bincode.decode(&bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn gzip() {
        let text = "meddler ".repeat(100);
        let compressed = compress(text.as_bytes()).unwrap();
        assert!(compressed.len() < text.len());
        assert_eq!(decompress(&compressed).unwrap(), text.as_bytes());
        assert!(decompress(b"not gzip").is_err());
    }

    #[test]
    fn gzip_limit() {
        let compressed = compress(&[0; 4096]).unwrap();
        assert_eq!(decompress_at_most(&compressed, 4096).unwrap().len(), 4096);
        let error = decompress_at_most(&compressed, 1000).unwrap_err();
        assert!(error.to_string().contains("1000"));
    }
}
