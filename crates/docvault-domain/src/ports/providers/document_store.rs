//! Document Store Port
//!
//! Narrow interface to the underlying document database. The repository
//! relies on the store for atomic single-document preconditions, atomic
//! batches and transactions; it never assumes anything beyond this trait.

use crate::error::Result;
use crate::value_objects::{AggregateResult, Aggregation, DocumentSnapshot, Query, WriteOp};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::sync::Arc;

/// Stream of documents produced by a large scan
pub type DocumentStream = BoxStream<'static, Result<DocumentSnapshot>>;

/// Document database port
///
/// # Error contract
///
/// - `WriteOp::Create` on an existing id → `Error::AlreadyExists`
/// - `WriteOp::Update` on a missing id → `Error::NotFound`
/// - a failed `Precondition` → `Error::FailedPrecondition`
/// - a query the store cannot serve without an index → `Error::MissingIndex`
/// - more than [`DocumentStore::max_batch_size`] ops in a batch → `Error::InvalidArgument`
#[async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Fetch one document
    async fn get(&self, collection: &str, id: &str) -> Result<Option<DocumentSnapshot>>;

    /// Fetch several documents of one collection, preserving input order
    async fn get_all(&self, collection: &str, ids: &[String])
    -> Result<Vec<Option<DocumentSnapshot>>>;

    /// Apply a single write
    async fn write(&self, op: WriteOp) -> Result<()>;

    /// Apply writes atomically: all or none
    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<()>;

    /// Largest number of operations a batch may carry
    fn max_batch_size(&self) -> usize;

    /// Run a query
    async fn query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>>;

    /// Run server-side aggregations over a query
    async fn aggregate(&self, query: &Query, aggregations: &[Aggregation])
    -> Result<AggregateResult>;

    /// Stream the results of a potentially large query
    fn stream(&self, query: Query) -> DocumentStream;

    /// Delete a document and every collection nested beneath it
    ///
    /// # Returns
    /// Number of documents removed
    async fn recursive_delete(&self, collection: &str, id: &str) -> Result<u64>;

    /// Start a transaction
    async fn begin_transaction(&self) -> Result<Arc<dyn Transaction>>;

    /// Get the name/identifier of this provider implementation
    fn provider_name(&self) -> &str;
}

/// Caller-managed transaction
///
/// Writes are buffered and applied atomically on [`Transaction::commit`].
/// Documents read through the transaction are validated at commit time; if
/// any changed since it was read, the commit fails with `Error::Aborted` and
/// nothing is applied.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Read a document, registering it for commit-time validation
    async fn get(&self, collection: &str, id: &str) -> Result<Option<DocumentSnapshot>>;

    /// Buffer a write
    async fn write(&self, op: WriteOp) -> Result<()>;

    /// Apply all buffered writes atomically
    async fn commit(&self) -> Result<()>;

    /// Discard all buffered writes
    async fn rollback(&self) -> Result<()>;
}
