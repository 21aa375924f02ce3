//! # docvault - Provider Implementations
//!
//! Concrete adapters for the ports defined in `docvault-domain`.
//!
//! ## Provider Categories
//!
//! | Category | Port | Implementations |
//! |----------|------|-----------------|
//! | Document store | `DocumentStore` | InMemory |
//! | Cache | `CacheProvider` | Moka, Redis, Null |
//! | Search | `SearchProvider` | InMemory, Null |
//! | Validation | `Validator` | JsonSchema, AcceptAll |
//! | Tasks | `TaskQueue` | Tokio |
//! | Clock | `Clock` | System, Manual |
//! | Metrics | `MetricsSink` | Counter, Tracing, Null |
//!
//! ## Feature Flags
//!
//! ```toml
//! [dependencies]
//! docvault-providers = { version = "0.1", default-features = false, features = ["cache-moka"] }
//! ```

pub use docvault_domain::error::{Error, Result};
pub use docvault_domain::ports::providers::{
    CacheProvider, DocumentStore, MetricsSink, SearchProvider, Validator,
};

/// Provider-specific constants
pub mod constants;

/// Cache provider implementations
pub mod cache;

/// Clock implementations
pub mod clock;

/// Document store implementations
pub mod document_store;

/// Metrics sink implementations
pub mod metrics;

/// Search provider implementations
pub mod search;

/// Background task queue implementations
pub mod tasks;

/// Validator implementations
pub mod validation;

pub use clock::{ManualClock, SystemClock};
pub use document_store::{InMemoryDocumentStore, IndexDefinition};
pub use tasks::TokioTaskQueue;
