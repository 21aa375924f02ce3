//! In-memory document store provider implementation
//!
//! Provides a transactional, ordered in-memory document database for
//! development and testing. Data is not persisted and will be lost on
//! restart.
//!
//! Every stored document carries a revision number taken from a
//! store-wide counter. Transactions record the revision of each document
//! they read and refuse to commit if any of them moved on.

use super::matcher::{compare_keys, compare_values, matches_filter, sort_key};
use async_trait::async_trait;
use docvault_domain::constants::{DEFAULT_MAX_BATCH_SIZE, FIELD_ID};
use docvault_domain::error::{Error, Result};
use docvault_domain::ports::providers::{DocumentStore, DocumentStream, Transaction};
use docvault_domain::value_objects::{
    AggregateResult, Aggregation, CollectionSelector, Document, DocumentSnapshot, FieldPath,
    Precondition, Query, WriteOp,
};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredDocument {
    data: Document,
    revision: u64,
}

type Collections = BTreeMap<String, BTreeMap<String, StoredDocument>>;
type DocKey = (String, String);

/// Composite index declaration
///
/// With index enforcement enabled, a query touching more than one field
/// (filters plus ordering, `id` excluded) only runs if a declared index on
/// its collection (or collection group) covers every one of those fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    /// Collection id (last path segment) the index applies to
    pub collection: String,
    /// Indexed fields
    pub fields: Vec<FieldPath>,
}

impl IndexDefinition {
    /// Create an index declaration
    pub fn new<S: Into<String>>(collection: S, fields: Vec<FieldPath>) -> Self {
        Self {
            collection: collection.into(),
            fields,
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    collections: RwLock<Collections>,
    revision: AtomicU64,
    indexes: Mutex<Option<Vec<IndexDefinition>>>,
}

impl StoreState {
    fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, AtomicOrdering::SeqCst) + 1
    }
}

/// In-memory document store provider
///
/// Cloning is cheap and clones share the same data.
#[derive(Debug, Clone)]
pub struct InMemoryDocumentStore {
    state: Arc<StoreState>,
    max_batch_size: usize,
}

impl InMemoryDocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_max_batch_size(DEFAULT_MAX_BATCH_SIZE)
    }

    /// Create an empty store with a custom per-batch operation limit
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            state: Arc::new(StoreState::default()),
            max_batch_size: max_batch_size.max(1),
        }
    }

    /// Reject multi-field queries that no declared index covers
    pub fn with_index_enforcement(self) -> Self {
        if let Ok(mut indexes) = self.state.indexes.lock() {
            indexes.get_or_insert_with(Vec::new);
        }
        self
    }

    /// Declare a composite index (enables index enforcement)
    pub fn declare_index(&self, index: IndexDefinition) {
        if let Ok(mut indexes) = self.state.indexes.lock() {
            indexes.get_or_insert_with(Vec::new).push(index);
        }
    }

    /// Number of documents stored directly in a collection path
    pub async fn document_count(&self, collection: &str) -> usize {
        self.state
            .collections
            .read()
            .await
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Raw stored form of a document, bypassing every repository concern
    pub async fn raw(&self, collection: &str, id: &str) -> Option<Document> {
        self.state
            .collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| doc.data.clone())
    }

    /// Overwrite the raw stored form of a document
    pub async fn put_raw(&self, collection: &str, id: &str, data: Document) {
        let revision = self.state.next_revision();
        self.state
            .collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), StoredDocument { data, revision });
    }

    fn check_index(&self, query: &Query) -> Result<()> {
        let Ok(guard) = self.state.indexes.lock() else {
            return Ok(());
        };
        let Some(indexes) = guard.as_ref() else {
            return Ok(());
        };

        let id_path = FieldPath::top_level(FIELD_ID);
        let fields: BTreeSet<&FieldPath> = query
            .filters
            .iter()
            .map(|f| &f.field)
            .chain(query.order_by.iter().map(|o| &o.field))
            .filter(|field| **field != id_path)
            .collect();
        if fields.len() <= 1 {
            return Ok(());
        }

        let collection_id = collection_id(&query.target);
        let covered = indexes.iter().any(|index| {
            index.collection == collection_id && fields.iter().all(|f| index.fields.contains(f))
        });
        if covered {
            return Ok(());
        }

        let definition = fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let scope = match query.target {
            CollectionSelector::Collection(_) => "collection",
            CollectionSelector::Group(_) => "collection group",
        };
        Err(Error::missing_index(format!(
            "The query requires an index. Create a composite index on {scope} '{collection_id}' with fields ({definition})"
        )))
    }

    async fn run_query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>> {
        self.check_index(query)?;
        let collections = self.state.collections.read().await;
        Ok(execute_query(&collections, query))
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn collection_id(target: &CollectionSelector) -> &str {
    match target {
        CollectionSelector::Collection(path) => path.rsplit('/').next().unwrap_or(path),
        CollectionSelector::Group(name) => name,
    }
}

fn targets(selector: &CollectionSelector, path: &str) -> bool {
    match selector {
        CollectionSelector::Collection(target) => target == path,
        CollectionSelector::Group(name) => path.rsplit('/').next() == Some(name.as_str()),
    }
}

/// Document fields as seen by queries: the document id answers for `id`
fn queryable(id: &str, data: &Document) -> Document {
    let mut view = data.clone();
    view.insert(FIELD_ID.to_string(), Value::String(id.to_string()));
    view
}

fn execute_query(collections: &Collections, query: &Query) -> Vec<DocumentSnapshot> {
    let mut rows: Vec<(Vec<Value>, DocumentSnapshot)> = Vec::new();
    for (path, docs) in collections {
        if !targets(&query.target, path) {
            continue;
        }
        for (id, stored) in docs {
            let view = queryable(id, &stored.data);
            if !query.filters.iter().all(|f| matches_filter(&view, f)) {
                continue;
            }
            let Some(key) = sort_key(&view, &query.order_by) else {
                continue;
            };
            rows.push((
                key,
                DocumentSnapshot {
                    collection: path.clone(),
                    id: id.clone(),
                    data: stored.data.clone(),
                },
            ));
        }
    }

    rows.sort_by(|(a, snap_a), (b, snap_b)| {
        compare_keys(a, b, &query.order_by).then_with(|| snap_a.path().cmp(&snap_b.path()))
    });

    let mut results: Vec<DocumentSnapshot> = rows
        .into_iter()
        .filter(|(key, _)| match &query.start_after {
            Some(cursor) => compare_keys(key, cursor, &query.order_by) == Ordering::Greater,
            None => true,
        })
        .map(|(_, snapshot)| snapshot)
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();

    if let Some(select) = &query.select {
        for snapshot in &mut results {
            let mut projected = Document::new();
            for field in select {
                if let Some(value) = field.get(&snapshot.data) {
                    field.set(&mut projected, value.clone());
                }
            }
            snapshot.data = projected;
        }
    }
    results
}

fn check_preconditions(
    current: Option<&StoredDocument>,
    preconditions: &[Precondition],
    path: &str,
) -> Result<()> {
    for precondition in preconditions {
        match precondition {
            Precondition::FieldEquals { field, value } => {
                let actual = current.and_then(|doc| field.get(&doc.data));
                let satisfied =
                    actual.is_some_and(|actual| compare_values(actual, value) == Ordering::Equal);
                if !satisfied {
                    return Err(Error::failed_precondition(format!(
                        "Precondition on '{field}' failed for {path}"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn deep_merge(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

/// Writes staged on top of the committed collections
///
/// Every op reads through the overlay, so later ops in a batch observe
/// earlier ones. Nothing touches the committed state until [`Staging::apply`].
struct Staging<'a> {
    base: &'a Collections,
    overlay: HashMap<DocKey, Option<Document>>,
    order: Vec<DocKey>,
}

impl<'a> Staging<'a> {
    fn new(base: &'a Collections) -> Self {
        Self {
            base,
            overlay: HashMap::new(),
            order: Vec::new(),
        }
    }

    fn current(&self, collection: &str, id: &str) -> Option<StoredDocument> {
        let key = (collection.to_string(), id.to_string());
        match self.overlay.get(&key) {
            Some(staged) => staged.clone().map(|data| StoredDocument { data, revision: 0 }),
            None => self
                .base
                .get(collection)
                .and_then(|docs| docs.get(id))
                .cloned(),
        }
    }

    fn stage(&mut self, collection: &str, id: &str, data: Option<Document>) {
        let key = (collection.to_string(), id.to_string());
        if !self.overlay.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.overlay.insert(key, data);
    }

    fn push(&mut self, op: WriteOp) -> Result<()> {
        match op {
            WriteOp::Create {
                collection,
                id,
                data,
            } => {
                if self.current(&collection, &id).is_some() {
                    return Err(Error::already_exists(format!("{collection}/{id}")));
                }
                self.stage(&collection, &id, Some(data));
            }
            WriteOp::Set {
                collection,
                id,
                data,
                merge,
            } => {
                let next = match (merge, self.current(&collection, &id)) {
                    (true, Some(mut existing)) => {
                        deep_merge(&mut existing.data, data);
                        existing.data
                    }
                    _ => data,
                };
                self.stage(&collection, &id, Some(next));
            }
            WriteOp::Update {
                collection,
                id,
                fields,
                preconditions,
            } => {
                let path = format!("{collection}/{id}");
                let current = self.current(&collection, &id);
                check_preconditions(current.as_ref(), &preconditions, &path)?;
                let Some(mut existing) = current else {
                    return Err(Error::not_found(path));
                };
                for (field, value) in fields {
                    field.set(&mut existing.data, value);
                }
                self.stage(&collection, &id, Some(existing.data));
            }
            WriteOp::Delete {
                collection,
                id,
                preconditions,
            } => {
                let path = format!("{collection}/{id}");
                let current = self.current(&collection, &id);
                if !preconditions.is_empty() {
                    check_preconditions(current.as_ref(), &preconditions, &path)?;
                }
                self.stage(&collection, &id, None);
            }
        }
        Ok(())
    }

    fn into_changes(self) -> Vec<(DocKey, Option<Document>)> {
        let mut overlay = self.overlay;
        self.order
            .into_iter()
            .filter_map(|key| overlay.remove(&key).map(|data| (key, data)))
            .collect()
    }
}

fn apply_changes(
    state: &StoreState,
    collections: &mut Collections,
    changes: Vec<(DocKey, Option<Document>)>,
) {
    for ((collection, id), data) in changes {
        match data {
            Some(data) => {
                let revision = state.next_revision();
                collections
                    .entry(collection)
                    .or_default()
                    .insert(id, StoredDocument { data, revision });
            }
            None => {
                if let Some(docs) = collections.get_mut(&collection) {
                    docs.remove(&id);
                    if docs.is_empty() {
                        collections.remove(&collection);
                    }
                }
            }
        }
    }
}

fn numeric(value: Option<&Value>) -> Option<f64> {
    value.and_then(Value::as_f64)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<DocumentSnapshot>> {
        let collections = self.state.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|doc| DocumentSnapshot {
                collection: collection.to_string(),
                id: id.to_string(),
                data: doc.data.clone(),
            }))
    }

    async fn get_all(
        &self,
        collection: &str,
        ids: &[String],
    ) -> Result<Vec<Option<DocumentSnapshot>>> {
        let collections = self.state.collections.read().await;
        let docs = collections.get(collection);
        Ok(ids
            .iter()
            .map(|id| {
                docs.and_then(|docs| docs.get(id))
                    .map(|doc| DocumentSnapshot {
                        collection: collection.to_string(),
                        id: id.clone(),
                        data: doc.data.clone(),
                    })
            })
            .collect())
    }

    async fn write(&self, op: WriteOp) -> Result<()> {
        self.batch_write(vec![op]).await
    }

    async fn batch_write(&self, ops: Vec<WriteOp>) -> Result<()> {
        if ops.len() > self.max_batch_size {
            return Err(Error::invalid_argument(format!(
                "Batch of {} operations exceeds the limit of {}",
                ops.len(),
                self.max_batch_size
            )));
        }
        let mut collections = self.state.collections.write().await;
        let mut staging = Staging::new(&collections);
        for op in ops {
            staging.push(op)?;
        }
        let changes = staging.into_changes();
        apply_changes(&self.state, &mut collections, changes);
        Ok(())
    }

    fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    async fn query(&self, query: &Query) -> Result<Vec<DocumentSnapshot>> {
        self.run_query(query).await
    }

    async fn aggregate(
        &self,
        query: &Query,
        aggregations: &[Aggregation],
    ) -> Result<AggregateResult> {
        let mut unlimited = query.clone();
        unlimited.start_after = None;
        unlimited.select = None;
        let matched = self.run_query(&unlimited).await?;

        let mut result = AggregateResult::new();
        for aggregation in aggregations {
            let value = match aggregation {
                Aggregation::Count => matched.len() as f64,
                Aggregation::Sum(field) => matched
                    .iter()
                    .filter_map(|doc| numeric(field.get(&doc.data)))
                    .sum(),
                Aggregation::Average(field) => {
                    let values: Vec<f64> = matched
                        .iter()
                        .filter_map(|doc| numeric(field.get(&doc.data)))
                        .collect();
                    if values.is_empty() {
                        0.0
                    } else {
                        values.iter().sum::<f64>() / values.len() as f64
                    }
                }
            };
            result.insert(aggregation.alias(), value);
        }
        Ok(result)
    }

    fn stream(&self, query: Query) -> DocumentStream {
        let store = self.clone();
        stream::once(async move { store.run_query(&query).await })
            .flat_map(|result| match result {
                Ok(docs) => stream::iter(docs).map(Ok).boxed(),
                Err(e) => stream::once(async move { Err(e) }).boxed(),
            })
            .boxed()
    }

    async fn recursive_delete(&self, collection: &str, id: &str) -> Result<u64> {
        let mut collections = self.state.collections.write().await;
        let mut removed = 0u64;

        if let Some(docs) = collections.get_mut(collection) {
            if docs.remove(id).is_some() {
                removed += 1;
            }
            if docs.is_empty() {
                collections.remove(collection);
            }
        }

        let prefix = format!("{collection}/{id}/");
        let nested: Vec<String> = collections
            .keys()
            .filter(|path| path.starts_with(&prefix))
            .cloned()
            .collect();
        for path in nested {
            if let Some(docs) = collections.remove(&path) {
                removed += docs.len() as u64;
            }
        }

        debug!(collection, id, removed, "Recursively deleted document tree");
        Ok(removed)
    }

    async fn begin_transaction(&self) -> Result<Arc<dyn Transaction>> {
        Ok(Arc::new(InMemoryTransaction::new(Arc::clone(&self.state))))
    }

    fn provider_name(&self) -> &str {
        "in_memory"
    }
}

/// Optimistic transaction over [`InMemoryDocumentStore`]
pub struct InMemoryTransaction {
    state: Arc<StoreState>,
    reads: Mutex<HashMap<DocKey, Option<u64>>>,
    writes: Mutex<Vec<WriteOp>>,
    finished: AtomicBool,
}

impl InMemoryTransaction {
    fn new(state: Arc<StoreState>) -> Self {
        Self {
            state,
            reads: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            finished: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finished.load(AtomicOrdering::SeqCst) {
            return Err(Error::failed_precondition("Transaction already finished"));
        }
        Ok(())
    }

    fn poisoned() -> Error {
        Error::internal("Transaction state lock poisoned")
    }
}

impl std::fmt::Debug for InMemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTransaction")
            .field("finished", &self.finished.load(AtomicOrdering::SeqCst))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<DocumentSnapshot>> {
        self.ensure_open()?;
        let collections = self.state.collections.read().await;
        let stored = collections.get(collection).and_then(|docs| docs.get(id));

        self.reads
            .lock()
            .map_err(|_| Self::poisoned())?
            .entry((collection.to_string(), id.to_string()))
            .or_insert_with(|| stored.map(|doc| doc.revision));

        Ok(stored.map(|doc| DocumentSnapshot {
            collection: collection.to_string(),
            id: id.to_string(),
            data: doc.data.clone(),
        }))
    }

    async fn write(&self, op: WriteOp) -> Result<()> {
        self.ensure_open()?;
        self.writes.lock().map_err(|_| Self::poisoned())?.push(op);
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        self.ensure_open()?;
        self.finished.store(true, AtomicOrdering::SeqCst);

        let reads = std::mem::take(&mut *self.reads.lock().map_err(|_| Self::poisoned())?);
        let writes = std::mem::take(&mut *self.writes.lock().map_err(|_| Self::poisoned())?);

        let mut collections = self.state.collections.write().await;
        for ((collection, id), seen) in &reads {
            let current = collections
                .get(collection)
                .and_then(|docs| docs.get(id))
                .map(|doc| doc.revision);
            if current != *seen {
                return Err(Error::aborted(format!(
                    "Transaction contention on {collection}/{id}"
                )));
            }
        }

        let mut staging = Staging::new(&collections);
        for op in writes {
            staging.push(op)?;
        }
        let changes = staging.into_changes();
        apply_changes(&self.state, &mut collections, changes);
        Ok(())
    }

    async fn rollback(&self) -> Result<()> {
        self.finished.store(true, AtomicOrdering::SeqCst);
        self.reads.lock().map_err(|_| Self::poisoned())?.clear();
        self.writes.lock().map_err(|_| Self::poisoned())?.clear();
        Ok(())
    }
}
