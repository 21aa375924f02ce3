//! Search Provider Port
//!
//! External full-text index kept in sync on a best-effort basis.

use crate::error::Result;
use crate::value_objects::Document;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default number of hits returned by a search
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Search request options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of hits
    pub limit: usize,
    /// Equality filters on top-level indexed fields
    pub filters: Vec<(String, Value)>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SEARCH_LIMIT,
            filters: Vec::new(),
        }
    }
}

impl SearchOptions {
    /// Add an equality filter
    pub fn with_filter<S: Into<String>>(mut self, field: S, value: Value) -> Self {
        self.filters.push((field.into(), value));
        self
    }

    /// Set the hit limit
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A single search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Id of the matching document
    pub id: String,
    /// Relevance score, higher is better
    pub score: f64,
}

/// Search provider port
#[async_trait]
pub trait SearchProvider: Send + Sync + std::fmt::Debug {
    /// Index (or re-index) a document
    async fn index(&self, collection: &str, id: &str, doc: &Document) -> Result<()>;

    /// Remove a document from the index
    async fn remove(&self, collection: &str, id: &str) -> Result<()>;

    /// Search a collection
    async fn search(
        &self,
        collection: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>>;

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}
