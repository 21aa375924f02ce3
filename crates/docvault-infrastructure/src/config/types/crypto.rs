//! Crypto configuration types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Field encryption configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CryptoConfig {
    /// AES-256 master key as 64 hex characters
    ///
    /// Without a key no crypto provider is wired and repositories that
    /// declare encrypted fields fail to build.
    pub master_key: Option<String>,
}

impl fmt::Debug for CryptoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoConfig")
            .field("master_key", &self.master_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
