//! Crypto Provider Port
//!
//! Authenticated symmetric encryption behind the field encryption codec.
//! The codec owns the stored text form; providers deal in raw bytes only.

use crate::error::Result;

/// Output of one encryption: the nonce drawn for it and the sealed bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBytes {
    pub nonce: Vec<u8>,
    /// Ciphertext including the authentication tag
    pub ciphertext: Vec<u8>,
}

impl SealedBytes {
    pub fn new(nonce: Vec<u8>, ciphertext: Vec<u8>) -> Self {
        Self { nonce, ciphertext }
    }
}

/// Symmetric cipher port
///
/// `encrypt` must draw a fresh nonce per call; `decrypt` must reject
/// tampered input instead of returning garbage.
pub trait CryptoProvider: Send + Sync {
    fn encrypt(&self, plaintext: &[u8]) -> Result<SealedBytes>;

    fn decrypt(&self, sealed: &SealedBytes) -> Result<Vec<u8>>;

    /// Algorithm name reported in logs
    fn provider_name(&self) -> &str;
}
