//! In-memory search provider
//!
//! Keeps a lowercase term list per document and scores hits by how many
//! query-term occurrences they contain. Only string values are tokenized;
//! nested objects and arrays are walked. Filters compare top-level fields
//! of the indexed document for equality.

use async_trait::async_trait;
use dashmap::DashMap;
use docvault_domain::error::Result;
use docvault_domain::ports::providers::{SearchHit, SearchOptions, SearchProvider};
use docvault_domain::value_objects::Document;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct IndexedDocument {
    terms: Vec<String>,
    fields: Document,
}

/// In-memory search provider
#[derive(Debug, Clone, Default)]
pub struct InMemorySearchProvider {
    collections: Arc<DashMap<String, DashMap<String, IndexedDocument>>>,
}

impl InMemorySearchProvider {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents indexed for a collection
    pub fn indexed_count(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, |docs| docs.len())
    }

    /// Whether a document is currently indexed
    pub fn is_indexed(&self, collection: &str, id: &str) -> bool {
        self.collections
            .get(collection)
            .is_some_and(|docs| docs.contains_key(id))
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}

fn collect_terms(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => out.extend(tokenize(text)),
        Value::Array(items) => items.iter().for_each(|item| collect_terms(item, out)),
        Value::Object(map) => map.values().for_each(|item| collect_terms(item, out)),
        _ => {}
    }
}

#[async_trait]
impl SearchProvider for InMemorySearchProvider {
    async fn index(&self, collection: &str, id: &str, doc: &Document) -> Result<()> {
        let mut terms = Vec::new();
        for value in doc.values() {
            collect_terms(value, &mut terms);
        }
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(
                id.to_string(),
                IndexedDocument {
                    terms,
                    fields: doc.clone(),
                },
            );
        Ok(())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<()> {
        if let Some(docs) = self.collections.get(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchHit>> {
        let wanted: Vec<String> = tokenize(query).collect();
        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<SearchHit> = docs
            .iter()
            .filter(|entry| {
                options
                    .filters
                    .iter()
                    .all(|(field, value)| entry.value().fields.get(field) == Some(value))
            })
            .filter_map(|entry| {
                let score = entry
                    .value()
                    .terms
                    .iter()
                    .filter(|term| wanted.contains(term))
                    .count();
                (score > 0).then(|| SearchHit {
                    id: entry.key().clone(),
                    score: score as f64,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits.truncate(options.limit);
        Ok(hits)
    }

    fn provider_name(&self) -> &str {
        "in_memory"
    }
}
