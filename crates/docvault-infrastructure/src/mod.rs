//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns that support the application and domain layers.
//!
//! Concrete adapters live in docvault-providers; this layer selects and wires
//! them from configuration.
//!
//! ## Module Categories
//!
//! ### Security
//! | Module | Description |
//! |--------|-------------|
//! | [`crypto`] | AES-256-GCM field encryption, key generation |
//!
//! ### Configuration & Wiring
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Layered TOML/environment configuration |
//! | [`bootstrap`] | `RepositoryServices` and default options from configuration |
//! | [`constants`] | Centralized configuration constants |
//!
//! ### Observability
//! | Module | Description |
//! |--------|-------------|
//! | [`logging`] | Structured logging with tracing |
//! | [`error_ext`] | Context extension for foreign errors |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod error_ext;
pub mod logging;

// Re-export commonly used types
pub use bootstrap::{build_services, repository_options};
pub use config::{AppConfig, ConfigLoader};
pub use crypto::CryptoService;
pub use error_ext::ErrorContext;
