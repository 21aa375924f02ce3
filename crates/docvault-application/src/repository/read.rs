//! Read operations

use super::{Repository, is_deleted};
use crate::options::{AggregateOptions, GetOptions, ListGroupOptions, ListOptions, MASKED_VALUE};
use crate::query::{Cursor, ListPlan, effective_limit};
use docvault_domain::constants::{FIELD_DELETED_AT, FIELD_ID};
use docvault_domain::entity::{Entity, Page, Record};
use docvault_domain::error::{Error, ErrorKind, Result};
use docvault_domain::ports::SearchOptions;
use docvault_domain::value_objects::{
    AggregateResult, Aggregation, Direction, Document, DocumentSnapshot, EntityVersion, FieldPath,
    Filter, MetricOperation, Query, document_path,
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Field snapshots are ordered by in `list_versions`
const VERSION_ORDER_FIELD: &str = "validTo";

impl<E: Entity> Repository<E> {
    /// Fetch one record
    ///
    /// # Errors
    /// - `NotFound` if the document is missing, or soft-deleted without
    ///   `include_deleted`
    /// - `PermissionDenied` if it belongs to another tenant
    pub async fn get(&self, id: &str, options: &GetOptions) -> Result<Record<E>> {
        let cache = self
            .cache
            .as_ref()
            .filter(|_| self.options.cache_enabled && self.transaction.is_none() && options.is_plain());
        let key = self.cache_key(id);

        let mut from_cache = false;
        let mut snapshot = None;
        if let Some(cache) = cache
            && let Some(data) = cache.get(&key).await?
        {
            from_cache = true;
            snapshot = Some(DocumentSnapshot {
                collection: self.collection.clone(),
                id: id.to_string(),
                data,
            });
        }
        if snapshot.is_none() {
            snapshot = self.fetch(id).await?;
        }
        let snapshot = snapshot.ok_or_else(|| Error::not_found(self.path_of(id)))?;

        self.check_tenant(&snapshot)?;
        if !options.include_deleted && is_deleted(&snapshot.data) {
            return Err(Error::not_found(snapshot.path()));
        }

        let record = self
            .materialize(&snapshot, &options.populate, &options.mask)
            .await?;

        if let Some(cache) = cache
            && !from_cache
        {
            cache.set(&key, &snapshot.data).await?;
        }
        Ok(record)
    }

    /// Whether a visible record exists
    pub async fn exists(&self, id: &str) -> Result<bool> {
        match self.get(id, &GetOptions::default()).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// One page of records from this collection
    pub async fn list(&self, options: &ListOptions) -> Result<Page<E>> {
        let base = self.scoped(Query::collection(&self.collection));
        self.list_query(base, options).await
    }

    /// One page of records from every collection named like this one
    ///
    /// Scoped by tenant when bound, otherwise by the explicit partition.
    pub async fn list_group(&self, options: &ListGroupOptions) -> Result<Page<E>> {
        let mut base = self.scoped(Query::group(self.group_name()));
        if self.tenant.is_none() {
            match &options.partition {
                Some(partition) => base = base.filter(partition.clone()),
                None => warn!(
                    collection = %self.group_name(),
                    "Collection group query without tenant or partition scope"
                ),
            }
        }
        self.list_query(base, &options.list).await
    }

    /// Count, sums and averages over matching records
    pub async fn aggregate(&self, options: &AggregateOptions) -> Result<AggregateResult> {
        let mut query = self.scoped(Query::collection(&self.collection));
        query.filters.extend(options.filters.iter().cloned());
        if self.options.soft_delete && !options.include_deleted {
            query = query.filter(Filter::eq(FIELD_DELETED_AT, Value::Null));
        }

        let mut aggregations = vec![Aggregation::Count];
        aggregations.extend(options.sum.iter().cloned().map(Aggregation::Sum));
        aggregations.extend(options.average.iter().cloned().map(Aggregation::Average));

        match self.store().aggregate(&query, &aggregations).await {
            Ok(result) => {
                self.record_metric(MetricOperation::Read, 1);
                Ok(result)
            }
            Err(e) => Err(self.report_query_error(&query, e)),
        }
    }

    /// Full-text search through the search provider
    ///
    /// Hits are re-read through `get`; hits that vanished or were
    /// soft-deleted since indexing are dropped.
    pub async fn search(&self, text: &str, options: &SearchOptions) -> Result<Vec<Record<E>>> {
        let Some(search) = &self.search else {
            return Err(Error::failed_precondition(format!(
                "No search provider configured for '{}'",
                self.collection
            )));
        };
        let mut options = options.clone();
        if let Some(scope) = &self.tenant {
            options = options.with_filter(scope.field(), Value::String(scope.tenant_id().to_string()));
        }

        let hits = search.provider().search(&self.collection, text, &options).await?;
        let mut records = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.get(&hit.id, &GetOptions::default()).await {
                Ok(record) => records.push(record),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(id = %hit.id, "Dropping stale search hit");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(records)
    }

    /// Version history of a record, newest first
    pub async fn list_versions(&self, id: &str) -> Result<Vec<EntityVersion>> {
        self.get(id, &GetOptions::default().include_deleted()).await?;

        let query = Query::collection(self.versions_collection(id))
            .order_by(FieldPath::top_level(VERSION_ORDER_FIELD), Direction::Desc)
            .order_by(FieldPath::top_level(FIELD_ID), Direction::Desc);
        let snapshots = self.run_query(&query).await?;

        snapshots
            .into_iter()
            .map(|snapshot| -> Result<EntityVersion> {
                let mut doc = snapshot.data;
                doc.insert(FIELD_ID.to_string(), Value::String(snapshot.id));
                let mut version: EntityVersion = serde_json::from_value(Value::Object(doc))?;
                for state in [&mut version.data, &mut version.diff].into_iter().flatten() {
                    if let Value::Object(fields) = state {
                        self.codec.decode(fields);
                    }
                }
                Ok(version)
            })
            .collect()
    }

    // ------------------------------------------------------------------

    pub(super) fn path_of(&self, id: &str) -> String {
        document_path(&self.collection, id)
    }

    fn group_name(&self) -> &str {
        self.collection
            .rsplit('/')
            .next()
            .unwrap_or(self.collection.as_str())
    }

    /// Add the tenant filter when bound
    pub(super) fn scoped(&self, query: Query) -> Query {
        match &self.tenant {
            Some(scope) => query.filter(scope.filter()),
            None => query,
        }
    }

    async fn list_query(&self, base: Query, options: &ListOptions) -> Result<Page<E>> {
        let plan = ListPlan {
            filters: options.filters.clone(),
            order_by: options.order_by.clone().unwrap_or_else(ListPlan::default_order),
            limit: effective_limit(options.limit),
            cursor: options.cursor.as_deref().map(Cursor::decode).transpose()?,
            exclude_deleted: self.options.soft_delete && !options.include_deleted,
        };
        let query = plan.apply(base);
        let snapshots = self.run_query(&query).await?;
        let next_cursor = plan.next_cursor(&snapshots);

        let mut data = Vec::with_capacity(snapshots.len());
        for snapshot in &snapshots {
            data.push(
                self.materialize(snapshot, &options.populate, &options.mask)
                    .await?,
            );
        }
        Ok(Page { data, next_cursor })
    }

    /// Decode, populate and mask a stored document
    async fn materialize(
        &self,
        snapshot: &DocumentSnapshot,
        populate: &[String],
        mask: &[FieldPath],
    ) -> Result<Record<E>> {
        let mut doc = self.decode(snapshot, true)?;
        let populated = if populate.is_empty() {
            BTreeMap::new()
        } else {
            self.populate(&doc, populate).await?
        };
        for path in mask {
            if let Some(value) = path.get_mut(&mut doc) {
                *value = match value {
                    Value::String(_) => Value::String(MASKED_VALUE.to_string()),
                    _ => Value::Null,
                };
            }
        }
        let mut record = self.to_record(&snapshot.collection, &snapshot.id, doc)?;
        record.populated = populated;
        Ok(record)
    }

    /// Load related documents for each requested relation
    ///
    /// Related documents of this collection are decoded and migrated like the
    /// parent; other collections are returned in their stored form. Each gets
    /// its `id` added and documents of another tenant are skipped.
    async fn populate(&self, doc: &Document, relations: &[String]) -> Result<BTreeMap<String, Value>> {
        let mut populated = BTreeMap::new();
        for name in relations {
            let relation = self.options.relations.get(name).ok_or_else(|| {
                Error::invalid_argument(format!("Unknown relation '{name}' on '{}'", self.collection))
            })?;
            let (ids, many) = match relation.field.get(doc) {
                Some(Value::String(id)) => (vec![id.clone()], false),
                Some(Value::Array(items)) => (
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect(),
                    true,
                ),
                _ => {
                    populated.insert(name.clone(), Value::Null);
                    continue;
                }
            };

            let related = self.store().get_all(&relation.collection, &ids).await?;
            self.record_metric(MetricOperation::Read, related.iter().flatten().count() as u64);

            let own_collection = relation.collection == self.collection;
            let visible = related
                .into_iter()
                .flatten()
                .filter(|snapshot| self.tenant.as_ref().is_none_or(|scope| scope.owns(&snapshot.data)))
                .map(|snapshot| -> Result<Value> {
                    let mut data = if own_collection {
                        self.decode(&snapshot, false)?
                    } else {
                        snapshot.data
                    };
                    data.insert(FIELD_ID.to_string(), Value::String(snapshot.id));
                    Ok(Value::Object(data))
                })
                .collect::<Result<Vec<Value>>>()?;

            let value = if many {
                Value::Array(visible)
            } else {
                visible.into_iter().next().unwrap_or(Value::Null)
            };
            populated.insert(name.clone(), value);
        }
        Ok(populated)
    }
}
