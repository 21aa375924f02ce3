//! Transactional outbox events

use chrono::{DateTime, Utc};
use docvault_domain::error::{Error, Result};
use docvault_domain::value_objects::{Document, OutboxEvent, OutboxStatus};
use serde_json::Value;

/// Build a pending event
pub fn pending_event(
    topic: &str,
    payload: Value,
    tenant_id: Option<&str>,
    now: DateTime<Utc>,
) -> Result<OutboxEvent> {
    if topic.trim().is_empty() {
        return Err(Error::invalid_argument("Outbox topic must not be empty"));
    }
    Ok(OutboxEvent {
        id: uuid::Uuid::new_v4().to_string(),
        topic: topic.to_string(),
        payload,
        status: OutboxStatus::Pending,
        created_at: now,
        tenant_id: tenant_id.map(str::to_string),
    })
}

/// Stored form of an event (the id is the document id, not a field)
pub fn to_document(event: &OutboxEvent) -> Result<Document> {
    match serde_json::to_value(event)? {
        Value::Object(mut doc) => {
            doc.remove("id");
            Ok(doc)
        }
        other => Err(Error::internal(format!("Outbox event serialized to {other}"))),
    }
}
