//! # Domain Layer
//!
//! Core types and boundary contracts of docvault, a generic multi-tenant
//! document repository.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`entity`] | `Entity` capability, `Record` envelope, `Page` |
//! | [`error`] | Error taxonomy with stable codes |
//! | [`value_objects`] | Field paths, documents, queries, outbox and version records |
//! | [`ports`] | Document store, cache, crypto, search, metrics, validator, tasks, clock |
//! | [`constants`] | System field names and defaults |

pub mod constants;
pub mod entity;
pub mod error;
pub mod ports;
pub mod value_objects;

pub use entity::{Entity, Page, Record};
pub use error::{Error, ErrorKind, Result};
