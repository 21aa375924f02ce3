//! AES-256-GCM field cipher

use crate::constants::{AES_GCM_KEY_SIZE, AES_GCM_NONCE_SIZE, AES_GCM_PROVIDER_NAME};
use crate::error_ext::ErrorContext;
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use docvault_domain::error::{Error, Result};
use docvault_domain::ports::providers::{CryptoProvider, SealedBytes};
use std::fmt;

/// Cipher for encrypted document fields
///
/// Keyed once from the configured master key. Every encryption draws a
/// fresh random 96-bit nonce from the OS.
#[derive(Clone)]
pub struct CryptoService {
    cipher: Aes256Gcm,
}

impl CryptoService {
    /// Build from a raw 32-byte key
    pub fn new(master_key: Vec<u8>) -> Result<Self> {
        if master_key.len() != AES_GCM_KEY_SIZE {
            return Err(Error::configuration(format!(
                "Master key must be {AES_GCM_KEY_SIZE} bytes, got {}",
                master_key.len()
            )));
        }
        let cipher = Aes256Gcm::new_from_slice(&master_key)
            .map_err(|_| Error::configuration("Master key rejected by AES-256-GCM"))?;
        Ok(Self { cipher })
    }

    /// Build from the hex form used in configuration
    pub fn from_hex(key: &str) -> Result<Self> {
        let bytes = hex::decode(key.trim()).config_context("Master key is not valid hex")?;
        Self::new(bytes)
    }

    /// Fresh random key
    pub fn generate_master_key() -> Vec<u8> {
        Aes256Gcm::generate_key(&mut OsRng).to_vec()
    }

    /// Fresh random key, hex encoded
    pub fn generate_master_key_hex() -> String {
        hex::encode(Self::generate_master_key())
    }
}

impl CryptoProvider for CryptoService {
    fn encrypt(&self, plaintext: &[u8]) -> Result<SealedBytes> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| Error::crypto("AES-GCM encryption failed"))?;
        Ok(SealedBytes::new(nonce.to_vec(), ciphertext))
    }

    fn decrypt(&self, sealed: &SealedBytes) -> Result<Vec<u8>> {
        if sealed.nonce.len() != AES_GCM_NONCE_SIZE {
            return Err(Error::crypto(format!(
                "Nonce must be {AES_GCM_NONCE_SIZE} bytes, got {}",
                sealed.nonce.len()
            )));
        }
        self.cipher
            .decrypt(Nonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice())
            .map_err(|_| Error::crypto("AES-GCM authentication failed"))
    }

    fn provider_name(&self) -> &str {
        AES_GCM_PROVIDER_NAME
    }
}

impl fmt::Debug for CryptoService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoService")
            .field("algorithm", &AES_GCM_PROVIDER_NAME)
            .finish_non_exhaustive()
    }
}
