//! Optimistic retries, outbox events and transactions

use super::{Repository, is_deleted};
use crate::concurrency::AtomicRetryPolicy;
use crate::options::UpdateOptions;
use crate::outbox;
use docvault_domain::entity::{Entity, Record};
use docvault_domain::error::{Error, Result};
use docvault_domain::ports::Transaction;
use docvault_domain::value_objects::{MetricOperation, WriteOp};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

impl<E: Entity> Repository<E> {
    /// Read-modify-write with optimistic retries
    ///
    /// `mutation` receives the current record and returns the changes to
    /// apply. The update carries the record's `updatedAt` as a precondition;
    /// on conflict the whole cycle is retried with exponential backoff.
    ///
    /// # Errors
    /// - `Aborted` once the retry budget is exhausted
    /// - `FailedPrecondition` on a transaction-bound repository
    pub async fn run_atomic<F>(
        &self,
        id: &str,
        mutation: F,
        policy: Option<AtomicRetryPolicy>,
    ) -> Result<Record<E>>
    where
        F: Fn(&Record<E>) -> Result<Value> + Send + Sync,
    {
        self.reject_transaction("run_atomic")?;
        let policy = policy.unwrap_or(self.options.retry_policy);

        for attempt in 0..=policy.max_retries {
            let record = self.load_fresh(id).await?;
            let changes = mutation(&record)?;
            let options = UpdateOptions::new().expect_updated_at(record.updated_at);
            match self.update(id, changes, &options).await {
                Ok(updated) => return Ok(updated),
                Err(e) if e.is_contention() => {
                    debug!(path = %record.path, attempt, error = %e, "Optimistic update conflict");
                    if attempt < policy.max_retries {
                        tokio::time::sleep(policy.delay_for(attempt)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(Error::aborted(format!(
            "{} is contended, gave up after {} attempts",
            self.path_of(id),
            policy.max_retries + 1
        )))
    }

    /// Append a pending outbox event to the bound transaction
    ///
    /// # Returns
    /// Id of the event
    ///
    /// # Errors
    /// `FailedPrecondition` unless the repository is transaction-bound
    pub async fn queue_event(&self, topic: &str, payload: Value) -> Result<String> {
        let Some(tx) = &self.transaction else {
            return Err(Error::failed_precondition(
                "queue_event requires a transaction-bound repository",
            ));
        };
        let event = outbox::pending_event(topic, payload, self.tenant_id(), self.services.clock.now())?;
        tx.write(WriteOp::Create {
            collection: self.options.outbox_collection.clone(),
            id: event.id.clone(),
            data: outbox::to_document(&event)?,
        })
        .await?;
        self.record_metric(MetricOperation::Write, 1);
        debug!(topic, event_id = %event.id, "Queued outbox event");
        Ok(event.id)
    }

    /// Start a transaction on the underlying store
    pub async fn begin_transaction(&self) -> Result<Arc<dyn Transaction>> {
        self.store().begin_transaction().await
    }

    /// Current record straight from the store, bypassing the cache
    async fn load_fresh(&self, id: &str) -> Result<Record<E>> {
        let snapshot = self
            .fetch(id)
            .await?
            .ok_or_else(|| Error::not_found(self.path_of(id)))?;
        self.check_tenant(&snapshot)?;
        if is_deleted(&snapshot.data) {
            return Err(Error::not_found(snapshot.path()));
        }
        let doc = self.decode(&snapshot, false)?;
        self.to_record(&snapshot.collection, &snapshot.id, doc)
    }
}
