//! Document Store Implementations
//!
//! | Provider | Type | Description |
//! |----------|------|-------------|
//! | [`InMemoryDocumentStore`] | Local | Ordered, transactional in-memory store |
//!
//! Production deployments plug their own database adapter in through the
//! `DocumentStore` port.

mod matcher;

pub mod in_memory;

pub use in_memory::{InMemoryDocumentStore, InMemoryTransaction, IndexDefinition};
pub use matcher::compare_values;
