//! Query building and opaque pagination cursors
//!
//! A cursor is the URL-safe base64 (unpadded) encoding of the JSON array
//! `[sortValue, id]` taken from the last stored document of a page. Every
//! list query orders by its sort field and then by `id` in the same
//! direction, so the pair identifies a unique position.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use docvault_domain::constants::{
    DEFAULT_PAGE_SIZE, FIELD_CREATED_AT, FIELD_DELETED_AT, FIELD_ID, MAX_PAGE_SIZE,
};
use docvault_domain::error::{Error, Result};
use docvault_domain::value_objects::{
    Direction, DocumentSnapshot, FieldPath, Filter, OrderBy, Query,
};
use serde_json::Value;

/// Decoded pagination cursor
#[derive(Debug, Clone, PartialEq)]
pub struct Cursor {
    /// Sort field value of the last returned document
    pub sort_value: Value,
    /// Id of the last returned document
    pub id: String,
}

impl Cursor {
    /// Encode as an opaque token
    pub fn encode(&self) -> String {
        let raw = Value::Array(vec![self.sort_value.clone(), Value::String(self.id.clone())]);
        URL_SAFE_NO_PAD.encode(raw.to_string())
    }

    /// Decode an opaque token
    ///
    /// # Errors
    /// `Error::InvalidArgument` for anything that is not a token produced by
    /// [`Cursor::encode`]
    pub fn decode(token: &str) -> Result<Self> {
        let invalid = || Error::invalid_argument("Invalid pagination cursor");
        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        let value: Value = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
        match value {
            Value::Array(mut parts) if parts.len() == 2 => {
                let id = match parts.pop() {
                    Some(Value::String(id)) => id,
                    _ => return Err(invalid()),
                };
                let sort_value = parts.pop().ok_or_else(invalid)?;
                Ok(Self { sort_value, id })
            }
            _ => Err(invalid()),
        }
    }

    /// Cursor positioned after a stored document
    pub fn after(snapshot: &DocumentSnapshot, sort_field: &FieldPath) -> Self {
        let sort_value = if sort_field.segments() == [FIELD_ID] {
            Value::String(snapshot.id.clone())
        } else {
            sort_field.get(&snapshot.data).cloned().unwrap_or(Value::Null)
        };
        Self {
            sort_value,
            id: snapshot.id.clone(),
        }
    }
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`
pub fn effective_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Declarative list request translated into a store [`Query`]
#[derive(Debug, Clone)]
pub struct ListPlan {
    /// Caller filters (equality / range / in)
    pub filters: Vec<Filter>,
    /// Sort field and direction
    pub order_by: OrderBy,
    /// Page size, already clamped
    pub limit: usize,
    /// Resume position
    pub cursor: Option<Cursor>,
    /// Exclude soft-deleted documents
    pub exclude_deleted: bool,
}

impl ListPlan {
    /// Default ordering: newest first
    pub fn default_order() -> OrderBy {
        OrderBy {
            field: FieldPath::top_level(FIELD_CREATED_AT),
            direction: Direction::Desc,
        }
    }

    /// Apply the plan to a base query (target plus scoping filters)
    pub fn apply(&self, mut query: Query) -> Query {
        query.filters.extend(self.filters.iter().cloned());
        if self.exclude_deleted {
            query = query.filter(Filter::eq(FIELD_DELETED_AT, Value::Null));
        }

        let id_path = FieldPath::top_level(FIELD_ID);
        query = query.order_by(self.order_by.field.clone(), self.order_by.direction);
        if self.order_by.field != id_path {
            query = query.order_by(id_path, self.order_by.direction);
        }

        if let Some(cursor) = &self.cursor {
            let values = if self.order_by.field.segments() == [FIELD_ID] {
                vec![Value::String(cursor.id.clone())]
            } else {
                vec![cursor.sort_value.clone(), Value::String(cursor.id.clone())]
            };
            query = query.start_after(values);
        }
        query.limit(self.limit)
    }

    /// Cursor for the page that follows `page`
    ///
    /// Present only when the page is full.
    pub fn next_cursor(&self, page: &[DocumentSnapshot]) -> Option<String> {
        if page.len() < self.limit {
            return None;
        }
        page.last()
            .map(|last| Cursor::after(last, &self.order_by.field).encode())
    }
}
