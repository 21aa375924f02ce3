//! # Application Layer
//!
//! The generic resilient repository and the concerns it is composed of.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`repository`] | `Repository<E>`: reads, writes, lifecycle, atomic operations |
//! | [`services`] | `RepositoryServices` shared by every repository |
//! | [`options`] | Repository configuration and per-call options |
//! | [`cache`] | Fail-open cache wrapper |
//! | [`resilience`] | Circuit breakers and their registry |
//! | [`codec`] | Field encryption and compression |
//! | [`migration`] | Lazy schema migration |
//! | [`tenancy`] | Tenant scoping |
//! | [`query`] | List plans and pagination cursors |
//! | [`concurrency`] | Optimistic retry policy |
//! | [`outbox`] | Transactional outbox events |
//! | [`search_sync`] | Background search index synchronization |
//! | [`hooks`] | Lifecycle hooks |

pub mod cache;
pub mod codec;
pub mod concurrency;
pub mod hooks;
pub mod migration;
pub mod options;
pub mod outbox;
pub mod query;
pub mod repository;
pub mod resilience;
pub mod search_sync;
pub mod services;
pub mod tenancy;

pub use cache::{CacheSettings, ResilientCache};
pub use concurrency::AtomicRetryPolicy;
pub use hooks::{NoHooks, RepositoryHooks};
pub use migration::MigrationRegistry;
pub use options::{
    AggregateOptions, GetOptions, ListGroupOptions, ListOptions, Relation, RepositoryOptions,
    UpdateOptions,
};
pub use repository::Repository;
pub use resilience::{BreakerRegistry, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerState};
pub use services::RepositoryServices;
pub use tenancy::TenantScope;
