//! Domain Port Interfaces
//!
//! Defines all boundary contracts between the repository and external
//! services. This follows the Dependency Inversion Principle:
//! - High-level modules (domain, application) define interfaces
//! - Low-level modules (providers, infrastructure) implement them
//!
//! ## Organization
//!
//! - **infrastructure/** - Infrastructure services (clock, background tasks)
//! - **providers/** - External service ports (document store, cache, search, crypto)

/// Infrastructure service ports
pub mod infrastructure;
/// External service provider ports
pub mod providers;

pub use infrastructure::{BackgroundTask, Clock, TaskQueue};
pub use providers::{
    CacheEntryConfig, CacheProvider, CacheStats, CryptoProvider, DocumentStore, DocumentStream,
    MetricsSink, SealedBytes, SearchHit, SearchOptions, SearchProvider, Transaction, Validator,
};
