//! Validator Implementations
//!
//! | Validator | Description |
//! |-----------|-------------|
//! | [`JsonSchemaValidator`] | JSON Schema (draft auto-detected) |
//! | [`AcceptAllValidator`] | Accepts every document |

pub mod accept_all;
#[cfg(feature = "schema-json")]
pub mod json_schema;

pub use accept_all::AcceptAllValidator;
#[cfg(feature = "schema-json")]
pub use json_schema::JsonSchemaValidator;
