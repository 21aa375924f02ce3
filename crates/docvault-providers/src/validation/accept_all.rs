//! Validator for entity types that carry no structural constraints

use docvault_domain::error::Result;
use docvault_domain::ports::providers::Validator;
use docvault_domain::value_objects::Document;

/// Accepts every document
///
/// An entity type opts out of validation explicitly by returning this from
/// `Entity::validator`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllValidator;

impl Validator for AcceptAllValidator {
    fn validate(&self, _data: &Document) -> Result<()> {
        Ok(())
    }

    fn validate_partial(&self, _data: &Document) -> Result<()> {
        Ok(())
    }
}
