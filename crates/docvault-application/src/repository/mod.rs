//! Generic resilient repository
//!
//! [`Repository<E>`] composes the cache, codecs, migrations, tenancy and
//! concurrency concerns over a [`DocumentStore`]. The public API is split
//! by concern:
//!
//! | Module | Operations |
//! |--------|------------|
//! | `read` | `get`, `exists`, `list`, `list_group`, `aggregate`, `search`, `list_versions` |
//! | `write` | `create`, `create_many`, `update`, `upsert` |
//! | `lifecycle` | `soft_delete`, `restore`, `force_delete`, `recursive_delete`, `purge_deleted`, `purge_versions` |
//! | `atomic` | `run_atomic`, `queue_event`, `begin_transaction` |
//!
//! Factories (`for_tenant`, `with_transaction`, `sub_collection`) are pure:
//! they return a new repository and never change the receiver.

mod atomic;
mod lifecycle;
mod read;
mod write;

use crate::cache::{ResilientCache, cache_key};
use crate::codec::{DocumentCodec, FieldCompression, FieldEncryption};
use crate::hooks::{NoHooks, RepositoryHooks};
use crate::migration::MigrationRegistry;
use crate::options::RepositoryOptions;
use crate::search_sync::SearchSync;
use crate::services::RepositoryServices;
use crate::tenancy::TenantScope;
use docvault_domain::constants::{
    FIELD_CREATED_AT, FIELD_DELETED_AT, FIELD_UPDATED_AT, SYSTEM_FIELDS, VERSIONS_COLLECTION,
};
use docvault_domain::entity::{Entity, Record};
use docvault_domain::error::{Error, Result};
use docvault_domain::ports::{DocumentStore, Transaction, Validator};
use docvault_domain::value_objects::{
    Document, DocumentSnapshot, MetricOperation, Query, WriteOp, document_path, timestamp,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Task name of read-repair submissions
pub const TASK_READ_REPAIR: &str = "repository.read_repair";

/// Generic document repository for entity type `E`
pub struct Repository<E: Entity> {
    services: RepositoryServices,
    options: Arc<RepositoryOptions>,
    codec: Arc<DocumentCodec>,
    cache: Option<ResilientCache>,
    search: Option<SearchSync>,
    validator: Arc<dyn Validator>,
    hooks: Arc<dyn RepositoryHooks<E>>,
    collection: String,
    tenant: Option<TenantScope>,
    transaction: Option<Arc<dyn Transaction>>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            services: self.services.clone(),
            options: Arc::clone(&self.options),
            codec: Arc::clone(&self.codec),
            cache: self.cache.clone(),
            search: self.search.clone(),
            validator: Arc::clone(&self.validator),
            hooks: Arc::clone(&self.hooks),
            collection: self.collection.clone(),
            tenant: self.tenant.clone(),
            transaction: self.transaction.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> fmt::Debug for Repository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &self.collection)
            .field("tenant", &self.tenant)
            .field("in_transaction", &self.transaction.is_some())
            .finish()
    }
}

impl<E: Entity> Repository<E> {
    /// Repository over the root collection `E::COLLECTION`
    ///
    /// # Errors
    /// `Error::Configuration` when encrypted fields are configured but the
    /// services carry no crypto provider
    pub fn new(services: RepositoryServices, options: RepositoryOptions) -> Result<Self> {
        Self::at(services, options, E::COLLECTION.to_string())
    }

    fn at(services: RepositoryServices, options: RepositoryOptions, collection: String) -> Result<Self> {
        let encryption = if options.encrypted_fields.is_empty() {
            None
        } else {
            let crypto = services.crypto.clone().ok_or_else(|| {
                Error::configuration(format!(
                    "Collection '{collection}' encrypts fields but no crypto provider is configured"
                ))
            })?;
            Some(FieldEncryption::new(crypto, options.encrypted_fields.clone()))
        };
        let compression = (!options.compressed_fields.is_empty()).then(|| {
            FieldCompression::new(
                options.compressed_fields.clone(),
                options.compression_min_length,
            )
        });

        Ok(Self {
            cache: services.resilient_cache(),
            search: services.search_sync(),
            codec: Arc::new(DocumentCodec::new(encryption, compression)),
            validator: E::validator(),
            hooks: Arc::new(NoHooks),
            options: Arc::new(options),
            services,
            collection,
            tenant: None,
            transaction: None,
            _entity: PhantomData,
        })
    }

    /// Install lifecycle hooks
    pub fn with_hooks(mut self, hooks: Arc<dyn RepositoryHooks<E>>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Repository bound to one tenant
    pub fn for_tenant<S: Into<String>>(&self, tenant_id: S) -> Self {
        let mut scoped = self.clone();
        scoped.tenant = Some(TenantScope::new(self.options.tenant_field.clone(), tenant_id));
        scoped
    }

    /// Repository whose reads and writes go through `transaction`
    pub fn with_transaction(&self, transaction: Arc<dyn Transaction>) -> Self {
        let mut bound = self.clone();
        bound.transaction = Some(transaction);
        bound
    }

    /// Repository over `{collection}/{parent_id}/{name}`
    ///
    /// Services, tenancy and transaction are inherited.
    pub fn sub_collection<C: Entity>(
        &self,
        parent_id: &str,
        name: &str,
        options: RepositoryOptions,
    ) -> Result<Repository<C>> {
        if parent_id.is_empty() || name.is_empty() || name.contains('/') {
            return Err(Error::invalid_argument(format!(
                "Invalid sub-collection '{name}' under '{parent_id}'"
            )));
        }
        let path = format!("{}/{parent_id}/{name}", self.collection);
        let mut child = Repository::<C>::at(self.services.clone(), options, path)?;
        child.tenant = self
            .tenant
            .as_ref()
            .map(|scope| TenantScope::new(child.options.tenant_field.clone(), scope.tenant_id()));
        child.transaction = self.transaction.clone();
        Ok(child)
    }

    /// Collection path this repository reads and writes
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Bound tenant, if any
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant.as_ref().map(TenantScope::tenant_id)
    }

    /// Whether this instance is bound to a transaction
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Static configuration
    pub fn options(&self) -> &RepositoryOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Store access
    // ------------------------------------------------------------------

    fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.services.store
    }

    fn record_metric(&self, operation: MetricOperation, count: u64) {
        if let Some(metrics) = &self.services.metrics {
            metrics.record(operation, count, self.tenant_id());
        }
    }

    fn versions_collection(&self, id: &str) -> String {
        format!("{}/{id}/{VERSIONS_COLLECTION}", self.collection)
    }

    fn cache_key(&self, id: &str) -> String {
        cache_key(&self.collection, id)
    }

    async fn fetch(&self, id: &str) -> Result<Option<DocumentSnapshot>> {
        let snapshot = match &self.transaction {
            Some(tx) => tx.get(&self.collection, id).await?,
            None => self.store().get(&self.collection, id).await?,
        };
        self.record_metric(MetricOperation::Read, u64::from(snapshot.is_some()));
        Ok(snapshot)
    }

    async fn apply(&self, op: WriteOp) -> Result<()> {
        let operation = if op.is_delete() {
            MetricOperation::Delete
        } else {
            MetricOperation::Write
        };
        match &self.transaction {
            Some(tx) => tx.write(op).await?,
            None => self.store().write(op).await?,
        }
        self.record_metric(operation, 1);
        Ok(())
    }

    async fn apply_batch(&self, ops: Vec<WriteOp>) -> Result<()> {
        let deletes = ops.iter().filter(|op| op.is_delete()).count() as u64;
        let writes = ops.len() as u64 - deletes;
        match &self.transaction {
            Some(tx) => {
                for op in ops {
                    tx.write(op).await?;
                }
            }
            None => self.store().batch_write(ops).await?,
        }
        if writes > 0 {
            self.record_metric(MetricOperation::Write, writes);
        }
        if deletes > 0 {
            self.record_metric(MetricOperation::Delete, deletes);
        }
        Ok(())
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>> {
        match self.store().query(query).await {
            Ok(snapshots) => {
                self.record_metric(MetricOperation::Read, snapshots.len() as u64);
                Ok(snapshots)
            }
            Err(e) => Err(self.report_query_error(query, e)),
        }
    }

    fn report_query_error(&self, query: &Query, e: Error) -> Error {
        if let Error::MissingIndex { message } = &e {
            error!(
                collection = %query.target.name(),
                index_hint = %message,
                "Query needs a composite index"
            );
        }
        e
    }

    fn chunk_size(&self) -> usize {
        self.options
            .batch_size
            .min(self.store().max_batch_size())
            .max(1)
    }

    async fn invalidate(&self, id: &str) -> Result<()> {
        if self.transaction.is_some() {
            return Ok(());
        }
        match &self.cache {
            Some(cache) => cache.delete(&self.cache_key(id)).await,
            None => Ok(()),
        }
    }

    fn sync_search(&self, id: &str, doc: &Document) {
        if self.transaction.is_some() {
            return;
        }
        if let Some(search) = &self.search {
            if is_deleted(doc) {
                search.remove(&self.collection, id);
            } else {
                search.index(&self.collection, id, doc.clone(), self.codec.sensitive_paths());
            }
        }
    }

    fn unindex(&self, id: &str) {
        if self.transaction.is_none()
            && let Some(search) = &self.search
        {
            search.remove(&self.collection, id);
        }
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    /// Decode a stored document and bring it to the target version
    ///
    /// With `repair`, upgraded documents get a read-repair scheduled unless
    /// the repository is bound to a transaction.
    fn decode(&self, snapshot: &DocumentSnapshot, repair: bool) -> Result<Document> {
        let mut doc = snapshot.data.clone();
        self.codec.decode(&mut doc);
        let target = self.options.target_version;
        let migrated = self.options.migrations.migrate(doc, target)?;
        if migrated.upgraded(target) {
            debug!(
                path = %snapshot.path(),
                from = migrated.from_version,
                to = target,
                "Migrated document on read"
            );
            if repair && self.transaction.is_none() {
                self.schedule_read_repair(snapshot, &migrated.document);
            }
        }
        Ok(migrated.document)
    }

    fn schedule_read_repair(&self, snapshot: &DocumentSnapshot, upgraded: &Document) {
        let Some(read_token) = snapshot.data.get(FIELD_UPDATED_AT).cloned() else {
            warn!(path = %snapshot.path(), "Skipping read-repair of a document without updatedAt");
            return;
        };
        let mut stored = upgraded.clone();
        if let Err(e) = self.codec.encode(&mut stored) {
            warn!(path = %snapshot.path(), error = %e, "Skipping read-repair, re-encoding failed");
            return;
        }
        let store = Arc::clone(self.store());
        let cache = self.cache.clone();
        let metrics = self.services.metrics.clone();
        let tenant = self.tenant_id().map(str::to_string);
        let record = move |operation: MetricOperation, count: u64| {
            if let Some(metrics) = &metrics {
                metrics.record(operation, count, tenant.as_deref());
            }
        };
        let collection = snapshot.collection.clone();
        let id = snapshot.id.clone();
        self.services.tasks.submit(
            TASK_READ_REPAIR,
            Box::pin(async move {
                let tx = store.begin_transaction().await?;
                let current = tx.get(&collection, &id).await?;
                record(MetricOperation::Read, u64::from(current.is_some()));
                let unchanged = current
                    .as_ref()
                    .is_some_and(|c| c.data.get(FIELD_UPDATED_AT) == Some(&read_token));
                if !unchanged {
                    tx.rollback().await?;
                    debug!(collection = %collection, id = %id, "Read-repair skipped, document changed");
                    return Ok(());
                }
                tx.write(WriteOp::Set {
                    collection: collection.clone(),
                    id: id.clone(),
                    data: stored,
                    merge: false,
                })
                .await?;
                tx.commit().await?;
                record(MetricOperation::Write, 1);
                if let Some(cache) = cache {
                    cache.delete(&cache_key(&collection, &id)).await?;
                }
                debug!(collection = %collection, id = %id, "Read-repair applied");
                Ok(())
            }),
        );
    }

    /// Build a record from a decoded document
    fn to_record(&self, collection: &str, id: &str, mut doc: Document) -> Result<Record<E>> {
        let path = document_path(collection, id);
        let created_at = timestamp::from_value(doc.get(FIELD_CREATED_AT))?
            .ok_or_else(|| Error::database(format!("Document {path} has no {FIELD_CREATED_AT}")))?;
        let updated_at = timestamp::from_value(doc.get(FIELD_UPDATED_AT))?.unwrap_or(created_at);
        let deleted_at = timestamp::from_value(doc.get(FIELD_DELETED_AT))?;
        let schema_version = MigrationRegistry::stored_version(&doc)?;
        for field in SYSTEM_FIELDS {
            doc.remove(field);
        }
        let data: E = serde_json::from_value(Value::Object(doc))?;
        Ok(Record {
            id: id.to_string(),
            path,
            created_at,
            updated_at,
            deleted_at,
            schema_version,
            data,
            populated: BTreeMap::new(),
        })
    }

    /// Check tenant ownership of a stored document
    fn check_tenant(&self, snapshot: &DocumentSnapshot) -> Result<()> {
        match &self.tenant {
            Some(scope) => scope.check(&snapshot.data, &snapshot.path()),
            None => Ok(()),
        }
    }
}

/// Whether a stored or decoded document is soft-deleted
pub(crate) fn is_deleted(doc: &Document) -> bool {
    doc.get(FIELD_DELETED_AT).is_some_and(|v| !v.is_null())
}

/// Domain fields of a document (system fields removed)
pub(crate) fn domain_fields(doc: &Document) -> Document {
    doc.iter()
        .filter(|(key, _)| !SYSTEM_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Serialize an entity into a JSON object
pub(crate) fn entity_document<T: serde::Serialize>(data: &T) -> Result<Document> {
    match serde_json::to_value(data)? {
        Value::Object(doc) => Ok(doc),
        other => Err(Error::invalid_argument(format!(
            "Entity must serialize to an object, got {other}"
        ))),
    }
}
