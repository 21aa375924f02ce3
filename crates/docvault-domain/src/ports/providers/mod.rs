//! External service provider ports

/// Cache backend port
pub mod cache;
/// Symmetric encryption port
pub mod crypto;
/// Document database port
pub mod document_store;
/// Metrics sink port
pub mod metrics;
/// Search index port
pub mod search;
/// Schema validator port
pub mod validator;

pub use cache::{CacheEntryConfig, CacheProvider, CacheStats};
pub use crypto::{CryptoProvider, SealedBytes};
pub use document_store::{DocumentStore, DocumentStream, Transaction};
pub use metrics::MetricsSink;
pub use search::{SearchHit, SearchOptions, SearchProvider};
pub use validator::Validator;
