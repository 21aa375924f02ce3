//! Field-level encryption
//!
//! Each configured value is serialized to JSON text, encrypted through the
//! [`CryptoProvider`] and stored as `hex(nonce):hex(ciphertext)`. Absent
//! and `null` values are left alone.

use docvault_domain::error::{Error, Result};
use docvault_domain::ports::providers::{CryptoProvider, SealedBytes};
use docvault_domain::value_objects::{Document, FieldPath};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Encrypts a fixed set of field paths
#[derive(Clone)]
pub struct FieldEncryption {
    crypto: Arc<dyn CryptoProvider>,
    fields: Vec<FieldPath>,
}

impl FieldEncryption {
    /// Create a codec for the given paths
    pub fn new(crypto: Arc<dyn CryptoProvider>, fields: Vec<FieldPath>) -> Self {
        Self { crypto, fields }
    }

    /// Encrypted paths
    pub fn fields(&self) -> &[FieldPath] {
        &self.fields
    }

    /// Encrypt one value into its stored form
    pub fn seal(&self, value: &Value) -> Result<String> {
        let plaintext = serde_json::to_vec(value)?;
        let sealed = self.crypto.encrypt(&plaintext)?;
        Ok(format!(
            "{}:{}",
            hex::encode(&sealed.nonce),
            hex::encode(&sealed.ciphertext)
        ))
    }

    /// Decrypt one stored value
    pub fn open(&self, stored: &str) -> Result<Value> {
        let (nonce, ciphertext) = stored
            .split_once(':')
            .ok_or_else(|| Error::crypto("Encrypted value is not in 'nonce:ciphertext' form"))?;
        let nonce = hex::decode(nonce).map_err(|e| Error::crypto(format!("Invalid nonce hex: {e}")))?;
        let ciphertext = hex::decode(ciphertext)
            .map_err(|e| Error::crypto(format!("Invalid ciphertext hex: {e}")))?;
        let plaintext = self.crypto.decrypt(&SealedBytes::new(nonce, ciphertext))?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Encrypt every configured field present in `doc`
    pub fn encrypt(&self, doc: &mut Document) -> Result<()> {
        for field in &self.fields {
            let Some(value) = field.get_mut(doc) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            *value = Value::String(self.seal(value)?);
        }
        Ok(())
    }

    /// Decrypt every configured field present in `doc`
    ///
    /// A value that fails to decrypt is kept as stored and logged.
    pub fn decrypt(&self, doc: &mut Document) {
        for field in &self.fields {
            let Some(value) = field.get_mut(doc) else {
                continue;
            };
            let Value::String(stored) = &*value else {
                continue;
            };
            match self.open(stored) {
                Ok(plain) => *value = plain,
                Err(e) => warn!(field = %field, error = %e, "Failed to decrypt field, keeping stored value"),
            }
        }
    }
}

impl fmt::Debug for FieldEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEncryption")
            .field("provider", &self.crypto.provider_name())
            .field("fields", &self.fields)
            .finish()
    }
}
