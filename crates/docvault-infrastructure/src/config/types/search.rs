//! Search configuration types

use serde::{Deserialize, Serialize};

/// Search backends
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchBackend {
    /// In-process inverted index
    InMemory,
    /// Accepts writes, returns no hits
    Null,
}

/// Search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Keep a search index in sync with writes
    pub enabled: bool,

    /// Search backend
    pub provider: SearchBackend,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: SearchBackend::InMemory,
        }
    }
}
