//! Null search provider
//!
//! Accepts index updates and returns no hits. Used when search is disabled.

use async_trait::async_trait;
use docvault_domain::error::Result;
use docvault_domain::ports::providers::{SearchHit, SearchOptions, SearchProvider};
use docvault_domain::value_objects::Document;

/// Search provider that never finds anything
#[derive(Debug, Clone, Default)]
pub struct NullSearchProvider;

impl NullSearchProvider {
    /// Create a new null search provider
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchProvider for NullSearchProvider {
    async fn index(&self, _collection: &str, _id: &str, _doc: &Document) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _collection: &str, _id: &str) -> Result<()> {
        Ok(())
    }

    async fn search(
        &self,
        _collection: &str,
        _query: &str,
        _options: &SearchOptions,
    ) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}
