//! Soft delete, restore, hard deletes and purges

use super::Repository;
use crate::options::{GetOptions, UpdateOptions};
use docvault_domain::constants::{FIELD_DELETED_AT, FIELD_ID};
use docvault_domain::entity::Entity;
use docvault_domain::error::{Error, Result};
use docvault_domain::value_objects::{
    Direction, Document, DocumentSnapshot, FieldPath, Filter, FilterOp, MetricOperation, Query,
    WriteOp, timestamp,
};
use futures::StreamExt;
use serde_json::Value;
use tracing::info;

impl<E: Entity> Repository<E> {
    /// Mark a record deleted
    ///
    /// Degrades to [`Repository::force_delete`] when soft deletes are off.
    pub async fn soft_delete(&self, id: &str) -> Result<()> {
        if !self.options.soft_delete {
            return self.force_delete(id).await;
        }
        let mut changes = Document::new();
        changes.insert(
            FIELD_DELETED_AT.to_string(),
            timestamp::to_value(self.services.clock.now()),
        );
        self.apply_update(id, changes, &UpdateOptions::default(), false)
            .await?;
        Ok(())
    }

    /// Clear the soft-delete marker
    ///
    /// # Errors
    /// `FailedPrecondition` when soft deletes are off
    pub async fn restore(&self, id: &str) -> Result<()> {
        if !self.options.soft_delete {
            return Err(Error::failed_precondition(format!(
                "Soft delete is disabled for '{}'",
                self.collection
            )));
        }
        let mut changes = Document::new();
        changes.insert(FIELD_DELETED_AT.to_string(), Value::Null);
        self.apply_update(id, changes, &UpdateOptions::default(), true)
            .await?;
        Ok(())
    }

    /// Remove a record from the store
    pub async fn force_delete(&self, id: &str) -> Result<()> {
        let current = self
            .fetch(id)
            .await?
            .ok_or_else(|| Error::not_found(self.path_of(id)))?;
        self.check_tenant(&current)?;
        self.apply(WriteOp::Delete {
            collection: self.collection.clone(),
            id: id.to_string(),
            preconditions: Vec::new(),
        })
        .await?;
        self.invalidate(id).await?;
        self.unindex(id);
        Ok(())
    }

    /// Remove a record and every collection nested beneath it
    ///
    /// # Returns
    /// Number of documents removed
    pub async fn recursive_delete(&self, id: &str) -> Result<u64> {
        self.reject_transaction("recursive_delete")?;
        self.get(id, &GetOptions::default().include_deleted()).await?;

        let removed = self.store().recursive_delete(&self.collection, id).await?;
        self.record_metric(MetricOperation::Delete, removed);
        self.invalidate(id).await?;
        self.unindex(id);
        info!(collection = %self.collection, id, removed, "Recursively deleted document");
        Ok(removed)
    }

    /// Hard-delete records soft-deleted more than `older_than_days` ago
    ///
    /// # Returns
    /// Number of records purged
    pub async fn purge_deleted(&self, older_than_days: u32) -> Result<u64> {
        self.reject_transaction("purge_deleted")?;
        let cutoff = self.services.clock.now() - chrono::Duration::days(i64::from(older_than_days));
        let query = self.scoped(Query::collection(&self.collection)).filter(Filter::new(
            FieldPath::top_level(FIELD_DELETED_AT),
            FilterOp::Lt,
            timestamp::to_value(cutoff),
        ));

        let mut chunks = self.store().stream(query).chunks(self.chunk_size());
        let mut purged = 0u64;
        let mut scanned_any = false;
        while let Some(chunk) = chunks.next().await {
            let snapshots = chunk.into_iter().collect::<Result<Vec<DocumentSnapshot>>>()?;
            scanned_any = true;
            self.record_metric(MetricOperation::Read, snapshots.len() as u64);
            purged += self.delete_all(&snapshots).await?;
            for snapshot in &snapshots {
                self.invalidate(&snapshot.id).await?;
                self.unindex(&snapshot.id);
            }
        }
        if !scanned_any {
            self.record_metric(MetricOperation::Read, 0);
        }
        info!(collection = %self.collection, purged, older_than_days, "Purged soft-deleted records");
        Ok(purged)
    }

    /// Delete the version history of a record
    ///
    /// # Returns
    /// Number of snapshots removed
    pub async fn purge_versions(&self, id: &str) -> Result<u64> {
        self.get(id, &GetOptions::default().include_deleted()).await?;
        let query = Query::collection(self.versions_collection(id))
            .order_by(FieldPath::top_level(FIELD_ID), Direction::Asc);
        let snapshots = self.run_query(&query).await?;

        let mut removed = 0u64;
        for chunk in snapshots.chunks(self.chunk_size()) {
            removed += self.delete_all(chunk).await?;
        }
        info!(collection = %self.collection, id, removed, "Purged version history");
        Ok(removed)
    }

    // ------------------------------------------------------------------

    async fn delete_all(&self, snapshots: &[DocumentSnapshot]) -> Result<u64> {
        if snapshots.is_empty() {
            return Ok(0);
        }
        let ops = snapshots
            .iter()
            .map(|snapshot| WriteOp::Delete {
                collection: snapshot.collection.clone(),
                id: snapshot.id.clone(),
                preconditions: Vec::new(),
            })
            .collect();
        self.apply_batch(ops).await?;
        Ok(snapshots.len() as u64)
    }

    pub(super) fn reject_transaction(&self, operation: &str) -> Result<()> {
        if self.transaction.is_some() {
            return Err(Error::failed_precondition(format!(
                "{operation} cannot run on a transaction-bound repository"
            )));
        }
        Ok(())
    }
}
