//! Write operations

use super::{Repository, domain_fields, entity_document, is_deleted};
use crate::migration::MigrationRegistry;
use crate::options::UpdateOptions;
use docvault_domain::constants::{
    FIELD_CREATED_AT, FIELD_DELETED_AT, FIELD_SCHEMA_VERSION, FIELD_UPDATED_AT, SYSTEM_FIELDS,
};
use docvault_domain::entity::{Entity, Record};
use docvault_domain::error::{Error, Result};
use docvault_domain::value_objects::{
    BulkItemError, BulkWriteResult, Document, DocumentSnapshot, EntityVersion, FieldPath,
    Precondition, VersionMode, WriteOp, flatten_update, timestamp,
};
use serde_json::Value;
use tracing::{debug, warn};

/// A create that passed stamping, hooks, validation and encoding
struct PreparedCreate {
    id: String,
    plain: Document,
    stored: Document,
}

impl<E: Entity> Repository<E> {
    /// Create a record
    ///
    /// A UUID v4 id is generated when `id` is `None`.
    ///
    /// # Errors
    /// - `AlreadyExists` if the id is taken
    /// - `ValidationFailed` if the entity fails its schema
    /// - `PermissionDenied` if the data names another tenant
    pub async fn create(&self, id: Option<&str>, data: &E) -> Result<Record<E>> {
        let prepared = self.prepare_create(id, data).await?;
        self.apply(WriteOp::Create {
            collection: self.collection.clone(),
            id: prepared.id.clone(),
            data: prepared.stored,
        })
        .await?;
        debug!(collection = %self.collection, id = %prepared.id, "Created document");
        self.finish_create(prepared.id, prepared.plain).await
    }

    /// Create many records, collecting per-item failures
    ///
    /// Items are validated independently and written in chunks of
    /// `min(batch_size, store limit)`; a failed chunk fails all of its
    /// items while later chunks still run.
    pub async fn create_many(&self, items: Vec<E>) -> Result<BulkWriteResult> {
        let mut result = BulkWriteResult::default();
        let mut prepared = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match self.prepare_create(None, item).await {
                Ok(item) => prepared.push((index, item)),
                Err(e) => result.errors.push(item_error(index, &e)),
            }
        }

        let chunk_size = self.chunk_size();
        let mut remaining = prepared.into_iter().peekable();
        while remaining.peek().is_some() {
            let chunk: Vec<(usize, PreparedCreate)> = remaining.by_ref().take(chunk_size).collect();
            let ops = chunk
                .iter()
                .map(|(_, item)| WriteOp::Create {
                    collection: self.collection.clone(),
                    id: item.id.clone(),
                    data: item.stored.clone(),
                })
                .collect();

            if let Err(e) = self.apply_batch(ops).await {
                warn!(
                    collection = %self.collection,
                    items = chunk.len(),
                    error = %e,
                    "Bulk chunk failed"
                );
                result
                    .errors
                    .extend(chunk.iter().map(|(index, _)| item_error(*index, &e)));
                continue;
            }

            for (_, item) in chunk {
                result.success_count += 1;
                result.ids.push(item.id.clone());
                if let Err(e) = self.finish_create(item.id, item.plain).await {
                    warn!(collection = %self.collection, error = %e, "after_create hook failed in bulk write");
                }
            }
        }

        result.errors.sort_by_key(|e| e.index);
        result.failure_count = result.errors.len();
        Ok(result)
    }

    /// Apply a partial update
    ///
    /// Nested objects in `changes` are flattened into field paths, so keys
    /// the caller leaves out are preserved. `id`, timestamps, `_v` and the
    /// tenant field cannot be changed.
    ///
    /// # Errors
    /// - `NotFound` if the record is missing or soft-deleted
    /// - `FailedPrecondition` if `expected_updated_at` does not match
    /// - `ValidationFailed` if the changes fail the partial schema
    pub async fn update(&self, id: &str, changes: Value, options: &UpdateOptions) -> Result<Record<E>> {
        let mut changes = into_document(changes)?;
        for field in SYSTEM_FIELDS {
            changes.remove(field);
        }
        changes.remove(&self.options.tenant_field);
        self.validator.validate_partial(&changes)?;
        self.apply_update(id, changes, options, false).await
    }

    /// Create or merge a record without assuming it exists
    ///
    /// New records get creation stamps and full validation; existing ones
    /// keep `createdAt`, their tenant and soft-delete marker and get partial
    /// validation.
    pub async fn upsert(&self, id: &str, data: &E) -> Result<Record<E>> {
        validate_id(id)?;
        let Some(current) = self.fetch(id).await? else {
            let prepared = self.prepare_create(Some(id), data).await?;
            self.apply(WriteOp::Set {
                collection: self.collection.clone(),
                id: prepared.id.clone(),
                data: prepared.stored,
                merge: true,
            })
            .await?;
            return self.finish_create(prepared.id, prepared.plain).await;
        };

        self.check_tenant(&current)?;
        let mut changes = entity_document(data)?;
        for field in SYSTEM_FIELDS {
            changes.remove(field);
        }
        changes.remove(&self.options.tenant_field);
        self.validator.validate_partial(&changes)?;

        let mut merged = self.decode(&current, false)?;
        for (path, value) in flatten_update(&changes, &self.codec.opaque_paths()) {
            path.set(&mut merged, value);
        }
        merged.insert(
            FIELD_UPDATED_AT.to_string(),
            timestamp::to_value(self.services.clock.now()),
        );

        let mut stored = merged.clone();
        self.codec.encode(&mut stored)?;
        self.apply(WriteOp::Set {
            collection: self.collection.clone(),
            id: id.to_string(),
            data: stored,
            merge: true,
        })
        .await?;
        self.invalidate(id).await?;
        self.sync_search(id, &merged);

        let record = self.to_record(&self.collection, id, merged)?;
        self.hooks.after_update(&record, &changes).await?;
        Ok(record)
    }

    // ------------------------------------------------------------------

    async fn prepare_create(&self, id: Option<&str>, data: &E) -> Result<PreparedCreate> {
        let id = match id {
            Some(id) => {
                validate_id(id)?;
                id.to_string()
            }
            None => uuid::Uuid::new_v4().to_string(),
        };

        let mut doc = entity_document(data)?;
        for field in SYSTEM_FIELDS {
            doc.remove(field);
        }
        if let Some(scope) = &self.tenant {
            scope.stamp(&mut doc)?;
        }
        let now = timestamp::to_value(self.services.clock.now());
        doc.insert(FIELD_CREATED_AT.to_string(), now.clone());
        doc.insert(FIELD_UPDATED_AT.to_string(), now);
        doc.insert(FIELD_DELETED_AT.to_string(), Value::Null);
        doc.insert(
            FIELD_SCHEMA_VERSION.to_string(),
            Value::from(self.options.target_version),
        );

        self.hooks.before_create(&mut doc).await?;
        self.validator.validate(&domain_fields(&doc))?;

        let mut stored = doc.clone();
        self.codec.encode(&mut stored)?;
        Ok(PreparedCreate {
            id,
            plain: doc,
            stored,
        })
    }

    async fn finish_create(&self, id: String, plain: Document) -> Result<Record<E>> {
        self.sync_search(&id, &plain);
        let record = self.to_record(&self.collection, &id, plain)?;
        self.hooks.after_create(&record).await?;
        Ok(record)
    }

    /// Shared update pipeline for `update`, `soft_delete` and `restore`
    pub(super) async fn apply_update(
        &self,
        id: &str,
        changes: Document,
        options: &UpdateOptions,
        include_deleted: bool,
    ) -> Result<Record<E>> {
        let current = self
            .fetch(id)
            .await?
            .ok_or_else(|| Error::not_found(self.path_of(id)))?;
        self.check_tenant(&current)?;
        if !include_deleted && is_deleted(&current.data) {
            return Err(Error::not_found(current.path()));
        }

        let mut preconditions = Vec::new();
        if let Some(expected) = options.expected_updated_at {
            let expected = timestamp::to_value(expected);
            if current.data.get(FIELD_UPDATED_AT) != Some(&expected) {
                return Err(Error::failed_precondition(format!(
                    "{} was modified after {expected}",
                    current.path()
                )));
            }
            preconditions.push(Precondition::FieldEquals {
                field: FieldPath::top_level(FIELD_UPDATED_AT),
                value: expected,
            });
        }

        let now = self.services.clock.now();
        let opaque = self.codec.opaque_paths();
        let plain_updates = flatten_update(&changes, &opaque);

        let mut merged = self.decode(&current, false)?;
        for (path, value) in &plain_updates {
            path.set(&mut merged, value.clone());
        }
        merged.insert(FIELD_UPDATED_AT.to_string(), timestamp::to_value(now));

        // Documents behind the target version are rewritten whole so the
        // stored form carries the upgraded shape and stamp.
        let behind = MigrationRegistry::stored_version(&current.data)? < self.options.target_version;
        let fields = if behind {
            let mut stored = merged.clone();
            self.codec.encode(&mut stored)?;
            stored
                .into_iter()
                .map(|(key, value)| (FieldPath::top_level(key), value))
                .collect()
        } else {
            let mut encoded = changes.clone();
            self.codec.encode(&mut encoded)?;
            let mut fields = flatten_update(&encoded, &opaque);
            fields.push((FieldPath::top_level(FIELD_UPDATED_AT), timestamp::to_value(now)));
            fields
        };

        let update = WriteOp::Update {
            collection: self.collection.clone(),
            id: id.to_string(),
            fields,
            preconditions,
        };
        match self.version_snapshot(&current, &plain_updates, options, now)? {
            Some(snapshot) => self.apply_batch(vec![snapshot, update]).await?,
            None => self.apply(update).await?,
        }

        self.invalidate(id).await?;
        self.sync_search(id, &merged);

        let record = self.to_record(&self.collection, id, merged)?;
        self.hooks.after_update(&record, &changes).await?;
        Ok(record)
    }

    /// Snapshot of the pre-update state, when versioning is enabled
    fn version_snapshot(
        &self,
        current: &DocumentSnapshot,
        changed: &[(FieldPath, Value)],
        options: &UpdateOptions,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<WriteOp>> {
        let Some(mode) = self.options.versioning else {
            return Ok(None);
        };
        let valid_from = timestamp::from_value(current.data.get(FIELD_UPDATED_AT))?.unwrap_or(now);
        let (data, diff) = match mode {
            VersionMode::Full => (Some(Value::Object(current.data.clone())), None),
            VersionMode::Diff => {
                let mut previous = Document::new();
                for (path, _) in changed {
                    let value = path.get(&current.data).cloned().unwrap_or(Value::Null);
                    path.set(&mut previous, value);
                }
                (None, Some(Value::Object(previous)))
            }
        };
        let version = EntityVersion {
            id: uuid::Uuid::new_v4().to_string(),
            entity_id: current.id.clone(),
            valid_from,
            valid_to: now,
            actor_id: options.actor_id.clone(),
            reason: options.reason.clone(),
            data,
            diff,
        };
        let mut doc = into_document(serde_json::to_value(&version)?)?;
        doc.remove("id");
        Ok(Some(WriteOp::Create {
            collection: self.versions_collection(&current.id),
            id: version.id,
            data: doc,
        }))
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains('/') {
        return Err(Error::invalid_argument(format!("Invalid document id '{id}'")));
    }
    Ok(())
}

fn into_document(value: Value) -> Result<Document> {
    match value {
        Value::Object(doc) => Ok(doc),
        other => Err(Error::invalid_argument(format!(
            "Expected a JSON object, got {other}"
        ))),
    }
}

fn item_error(index: usize, e: &Error) -> BulkItemError {
    BulkItemError {
        index,
        code: e.code().to_string(),
        error: e.to_string(),
    }
}
