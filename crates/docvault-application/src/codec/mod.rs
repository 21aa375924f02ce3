//! Field codecs applied between the repository and the store
//!
//! Write order is encrypt then compress; read order is decompress then
//! decrypt. Both codecs only touch their configured field paths and leave
//! every other field untouched.

pub mod compression;
pub mod encryption;

pub use compression::{COMPRESSED_PREFIX, DEFAULT_COMPRESSION_MIN_LENGTH, FieldCompression};
pub use encryption::FieldEncryption;

use docvault_domain::error::Result;
use docvault_domain::value_objects::{Document, FieldPath};

/// Combined encryption and compression codec for one collection
#[derive(Debug, Clone, Default)]
pub struct DocumentCodec {
    encryption: Option<FieldEncryption>,
    compression: Option<FieldCompression>,
}

impl DocumentCodec {
    /// Create a codec from its optional parts
    pub fn new(encryption: Option<FieldEncryption>, compression: Option<FieldCompression>) -> Self {
        Self {
            encryption,
            compression,
        }
    }

    /// Paths whose stored value is opaque (must be written whole)
    pub fn opaque_paths(&self) -> Vec<FieldPath> {
        let mut paths = Vec::new();
        if let Some(encryption) = &self.encryption {
            paths.extend(encryption.fields().iter().cloned());
        }
        if let Some(compression) = &self.compression {
            paths.extend(compression.fields().iter().cloned());
        }
        paths
    }

    /// Paths whose plaintext must never leave the repository
    pub fn sensitive_paths(&self) -> &[FieldPath] {
        self.encryption.as_ref().map_or(&[], FieldEncryption::fields)
    }

    /// Encode a document (or a partial change set) for storage
    pub fn encode(&self, doc: &mut Document) -> Result<()> {
        if let Some(encryption) = &self.encryption {
            encryption.encrypt(doc)?;
        }
        if let Some(compression) = &self.compression {
            compression.compress(doc)?;
        }
        Ok(())
    }

    /// Decode a stored document
    ///
    /// Per-field failures are logged and leave the stored value in place.
    pub fn decode(&self, doc: &mut Document) {
        if let Some(compression) = &self.compression {
            compression.decompress(doc);
        }
        if let Some(encryption) = &self.encryption {
            encryption.decrypt(doc);
        }
    }
}
