//! Raw documents and write operations exchanged with the document store

use super::field_path::FieldPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document: a JSON object keyed by field name
pub type Document = Map<String, Value>;

/// A document as read from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    /// Collection path holding the document (e.g. `orgs/o1/tasks`)
    pub collection: String,
    /// Document id within the collection
    pub id: String,
    /// Stored fields
    pub data: Document,
}

impl DocumentSnapshot {
    /// Full document path (`{collection}/{id}`)
    pub fn path(&self) -> String {
        document_path(&self.collection, &self.id)
    }
}

/// Join a collection path and a document id
pub fn document_path(collection: &str, id: &str) -> String {
    format!("{collection}/{id}")
}

/// Condition the stored document must satisfy for a write to apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Precondition {
    /// The field at `field` must equal `value`
    FieldEquals {
        /// Field to compare
        field: FieldPath,
        /// Expected stored value
        value: Value,
    },
}

/// A single write against the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WriteOp {
    /// Create a document; fails with `AlreadyExists` if the id is taken
    Create {
        /// Target collection path
        collection: String,
        /// Document id
        id: String,
        /// Full document
        data: Document,
    },
    /// Write a document, replacing it or deep-merging into it
    Set {
        /// Target collection path
        collection: String,
        /// Document id
        id: String,
        /// Fields to write
        data: Document,
        /// Merge into the existing document instead of replacing it
        merge: bool,
    },
    /// Update fields of an existing document; fails with `NotFound` if absent
    Update {
        /// Target collection path
        collection: String,
        /// Document id
        id: String,
        /// Field path / value pairs
        fields: Vec<(FieldPath, Value)>,
        /// Conditions checked atomically with the write
        preconditions: Vec<Precondition>,
    },
    /// Delete a document (no-op if absent)
    Delete {
        /// Target collection path
        collection: String,
        /// Document id
        id: String,
        /// Conditions checked atomically with the delete
        preconditions: Vec<Precondition>,
    },
}

impl WriteOp {
    /// Collection path this write targets
    pub fn collection(&self) -> &str {
        match self {
            Self::Create { collection, .. }
            | Self::Set { collection, .. }
            | Self::Update { collection, .. }
            | Self::Delete { collection, .. } => collection,
        }
    }

    /// Document id this write targets
    pub fn id(&self) -> &str {
        match self {
            Self::Create { id, .. }
            | Self::Set { id, .. }
            | Self::Update { id, .. }
            | Self::Delete { id, .. } => id,
        }
    }

    /// Whether this write removes the document
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}
