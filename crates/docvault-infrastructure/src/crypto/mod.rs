//! Cryptographic services module
//!
//! AES-256-GCM implementation of the `CryptoProvider` port used for
//! field-level encryption.

mod encryption;

pub use encryption::CryptoService;
