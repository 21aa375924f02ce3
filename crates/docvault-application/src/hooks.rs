//! Lifecycle hooks
//!
//! Hooks run inline with the write pipeline. An error from `before_create`
//! aborts the create; errors from the after-hooks are returned to the caller
//! even though the write itself has already been applied.

use async_trait::async_trait;
use docvault_domain::entity::{Entity, Record};
use docvault_domain::error::Result;
use docvault_domain::value_objects::Document;

/// Per-entity write hooks; every method defaults to a no-op
#[async_trait]
pub trait RepositoryHooks<E: Entity>: Send + Sync {
    /// Runs after stamping and before validation; may adjust the document
    async fn before_create(&self, _doc: &mut Document) -> Result<()> {
        Ok(())
    }

    /// Runs after a successful create
    async fn after_create(&self, _record: &Record<E>) -> Result<()> {
        Ok(())
    }

    /// Runs after a successful update with the caller's changes
    async fn after_update(&self, _record: &Record<E>, _changes: &Document) -> Result<()> {
        Ok(())
    }
}

/// Hooks that do nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl<E: Entity> RepositoryHooks<E> for NoHooks {}
