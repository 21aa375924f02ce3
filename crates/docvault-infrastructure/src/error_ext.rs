//! Context for foreign errors
//!
//! Bootstrap touches files, TOML, hex keys and the tracing registry. Their
//! errors are wrapped into domain errors with a short description of the
//! step that failed, keeping the original as the source.

use docvault_domain::error::{Error, Result};
use std::fmt;

/// Which domain variant a wrapped error becomes
#[derive(Debug, Clone, Copy)]
enum Layer {
    Infrastructure,
    Io,
    Configuration,
}

fn wrap<E>(layer: Layer, step: &dyn fmt::Display, err: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    match layer {
        Layer::Infrastructure => Error::infrastructure_with_source(format!("{step}: {err}"), err),
        Layer::Io => Error::infrastructure_with_source(format!("I/O: {step}: {err}"), err),
        Layer::Configuration => Error::configuration_with_source(format!("{step}: {err}"), err),
    }
}

/// Attach the failing step to a foreign `Result`
///
/// ```ignore
/// let key = hex::decode(&raw).config_context("Master key is not valid hex")?;
/// std::fs::write(&path, text).io_context("Failed to write config file")?;
/// ```
pub trait ErrorContext<T> {
    /// Wrap as an infrastructure error
    fn context(self, step: impl fmt::Display) -> Result<T>;

    /// Wrap as an infrastructure error raised by file or socket I/O
    fn io_context(self, step: impl fmt::Display) -> Result<T>;

    /// Wrap as a configuration error
    fn config_context(self, step: impl fmt::Display) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, step: impl fmt::Display) -> Result<T> {
        self.map_err(|err| wrap(Layer::Infrastructure, &step, err))
    }

    fn io_context(self, step: impl fmt::Display) -> Result<T> {
        self.map_err(|err| wrap(Layer::Io, &step, err))
    }

    fn config_context(self, step: impl fmt::Display) -> Result<T> {
        self.map_err(|err| wrap(Layer::Configuration, &step, err))
    }
}
