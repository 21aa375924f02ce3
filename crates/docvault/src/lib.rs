//! # docvault
//!
//! A generic resilient document repository: tenant isolation, fail-open
//! caching, field encryption and compression, lazy schema migration,
//! optimistic concurrency, a transactional outbox, cursor pagination and
//! version history over any document store.
//!
//! ## Example
//!
//! ```ignore
//! use docvault::prelude::*;
//!
//! let config = ConfigLoader::new().load()?;
//! let services = build_services(&config, Arc::new(InMemoryDocumentStore::new()))?;
//! let tasks: Repository<Task> = Repository::new(services, repository_options(&config))?;
//!
//! let acme = tasks.for_tenant("acme");
//! let created = acme.create(None, &Task { title: "Ship".into() }).await?;
//! let page = acme.list(&ListOptions::new().limit(20)).await?;
//! ```
//!
//! ## Architecture
//!
//! - `domain` - entity capability, value objects, errors and port traits
//! - `application` - `Repository<E>` and its concerns
//! - `providers` - in-memory store, caches, search, validators, task queue
//! - `infrastructure` - configuration, logging, AES-GCM crypto, bootstrap

/// Domain layer - entity capability, value objects, errors and ports
pub mod domain {
    pub use docvault_domain::*;
}

/// Application layer - the repository and its concerns
pub mod application {
    pub use docvault_application::*;
}

/// Provider implementations
pub mod providers {
    pub use docvault_providers::*;
}

/// Infrastructure layer - configuration, logging, crypto and bootstrap
pub mod infrastructure {
    pub use docvault_infrastructure::*;
}

/// Everything needed to declare an entity and work with its repository
pub mod prelude {
    pub use docvault_application::{
        AggregateOptions, AtomicRetryPolicy, GetOptions, ListGroupOptions, ListOptions,
        MigrationRegistry, NoHooks, Relation, Repository, RepositoryHooks, RepositoryOptions,
        RepositoryServices, UpdateOptions,
    };
    pub use docvault_domain::ports::{SearchOptions, Validator};
    pub use docvault_domain::value_objects::{Direction, FieldPath, Filter, FilterOp, VersionMode};
    pub use docvault_domain::{Entity, Error, ErrorKind, Page, Record, Result};
    pub use docvault_infrastructure::{AppConfig, ConfigLoader, build_services, repository_options};
    pub use docvault_providers::InMemoryDocumentStore;
    pub use docvault_providers::validation::JsonSchemaValidator;
}

pub use docvault_application::Repository;
pub use docvault_domain::{Entity, Error, ErrorKind, Record, Result};
