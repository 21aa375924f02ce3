//! Compression configuration types

use docvault_application::codec::DEFAULT_COMPRESSION_MIN_LENGTH;
use serde::{Deserialize, Serialize};

/// Field compression configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// Strings shorter than this many bytes are stored as is
    pub min_length: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_COMPRESSION_MIN_LENGTH,
        }
    }
}
