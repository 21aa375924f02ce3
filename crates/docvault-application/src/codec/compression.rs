//! Size-triggered field compression
//!
//! String values at least `min_length` bytes long are gzipped and stored
//! base64-encoded behind the `gz1:` prefix. Shorter strings and non-string
//! values are stored as-is, so reads only decompress prefixed values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use docvault_domain::error::{Error, Result};
use docvault_domain::value_objects::{Document, FieldPath};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde_json::Value;
use std::io::{Read, Write};
use tracing::warn;

/// Marker prefix of compressed values
pub const COMPRESSED_PREFIX: &str = "gz1:";

/// Default minimum length (bytes) that triggers compression
pub const DEFAULT_COMPRESSION_MIN_LENGTH: usize = 1024;

/// Compresses a fixed set of string field paths
#[derive(Debug, Clone)]
pub struct FieldCompression {
    fields: Vec<FieldPath>,
    min_length: usize,
}

impl FieldCompression {
    /// Create a codec for the given paths
    pub fn new(fields: Vec<FieldPath>, min_length: usize) -> Self {
        Self { fields, min_length }
    }

    /// Compressed paths
    pub fn fields(&self) -> &[FieldPath] {
        &self.fields
    }

    /// Compress one string
    pub fn pack(text: &str) -> Result<String> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(text.as_bytes())
            .and_then(|()| encoder.finish())
            .map(|bytes| format!("{COMPRESSED_PREFIX}{}", STANDARD.encode(bytes)))
            .map_err(|e| Error::internal(format!("Compression failed: {e}")))
    }

    /// Decompress one stored string
    pub fn unpack(stored: &str) -> Result<String> {
        let encoded = stored
            .strip_prefix(COMPRESSED_PREFIX)
            .ok_or_else(|| Error::invalid_argument("Value is not compressed"))?;
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| Error::invalid_argument(format!("Invalid compressed payload: {e}")))?;
        let mut text = String::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_string(&mut text)
            .map_err(|e| Error::invalid_argument(format!("Invalid gzip payload: {e}")))?;
        Ok(text)
    }

    /// Compress every configured string field long enough to qualify
    pub fn compress(&self, doc: &mut Document) -> Result<()> {
        for field in &self.fields {
            if let Some(Value::String(text)) = field.get_mut(doc) {
                if text.len() >= self.min_length {
                    *text = Self::pack(text)?;
                }
            }
        }
        Ok(())
    }

    /// Decompress every configured field carrying the prefix
    pub fn decompress(&self, doc: &mut Document) {
        for field in &self.fields {
            let Some(Value::String(stored)) = field.get_mut(doc) else {
                continue;
            };
            if !stored.starts_with(COMPRESSED_PREFIX) {
                continue;
            }
            match Self::unpack(stored) {
                Ok(text) => *stored = text,
                Err(e) => warn!(field = %field, error = %e, "Failed to decompress field, keeping stored value"),
            }
        }
    }
}
