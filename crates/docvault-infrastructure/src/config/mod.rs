//! Configuration management
//!
//! Layered [`AppConfig`] loading through figment: built-in defaults, then
//! `docvault.toml`, then `DOCVAULT_*` environment variables.

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
