//! Lazy schema migration
//!
//! Stored documents carry a `_v` stamp (absent means version 1). On read
//! the document is walked up to the target version one step at a time; a
//! step without a registered migration leaves the document unchanged.

use docvault_domain::constants::{FIELD_SCHEMA_VERSION, INITIAL_SCHEMA_VERSION};
use docvault_domain::error::{Error, Result};
use docvault_domain::value_objects::Document;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Upgrades a document from version `n` to `n + 1`
pub type Migration = Arc<dyn Fn(Document) -> Result<Document> + Send + Sync>;

/// Ordered set of single-step migrations
#[derive(Clone, Default)]
pub struct MigrationRegistry {
    steps: BTreeMap<u32, Migration>,
}

/// Outcome of running a document through the registry
#[derive(Debug, Clone, PartialEq)]
pub struct Migrated {
    /// Document at the target version
    pub document: Document,
    /// Version the document was stored at
    pub from_version: u32,
}

impl Migrated {
    /// Whether any step ran
    pub fn upgraded(&self, target: u32) -> bool {
        self.from_version < target
    }
}

impl MigrationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the step upgrading `from_version` to `from_version + 1`
    pub fn register<F>(mut self, from_version: u32, step: F) -> Self
    where
        F: Fn(Document) -> Result<Document> + Send + Sync + 'static,
    {
        self.steps.insert(from_version, Arc::new(step));
        self
    }

    /// Versions that have a registered step
    pub fn versions(&self) -> Vec<u32> {
        self.steps.keys().copied().collect()
    }

    /// Schema version a stored document declares
    pub fn stored_version(doc: &Document) -> Result<u32> {
        match doc.get(FIELD_SCHEMA_VERSION) {
            None | Some(Value::Null) => Ok(INITIAL_SCHEMA_VERSION),
            Some(value) => value
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| Error::invalid_argument(format!("Invalid schema version {value}"))),
        }
    }

    /// Bring a document up to `target`
    ///
    /// Documents already at or beyond the target are returned unchanged.
    pub fn migrate(&self, mut document: Document, target: u32) -> Result<Migrated> {
        let from_version = Self::stored_version(&document)?;
        if from_version >= target {
            return Ok(Migrated {
                document,
                from_version,
            });
        }
        for version in from_version..target {
            if let Some(step) = self.steps.get(&version) {
                document = step(document)?;
            }
        }
        document.insert(FIELD_SCHEMA_VERSION.to_string(), Value::from(target));
        Ok(Migrated {
            document,
            from_version,
        })
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("versions", &self.versions())
            .finish()
    }
}
