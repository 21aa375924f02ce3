//! Schema Validator Port
//!
//! Every entity type supplies a validator explicitly through
//! [`crate::entity::Entity::validator`]; there is no optional schema.

use crate::error::Result;
use crate::value_objects::Document;

/// Structural validation of entity data
///
/// Both methods receive domain fields only: repository-owned fields
/// (`id`, timestamps, `_v`) are stripped before validation.
pub trait Validator: Send + Sync {
    /// Validate a complete entity
    ///
    /// # Errors
    /// `Error::ValidationFailed` listing every issue found
    fn validate(&self, data: &Document) -> Result<()>;

    /// Validate a partial update: only the present fields are checked
    ///
    /// # Errors
    /// `Error::ValidationFailed` listing every issue found
    fn validate_partial(&self, data: &Document) -> Result<()>;
}
