//! JSON Schema validator
//!
//! Compiles a schema twice: once as given for full validation and once with
//! every `required` list removed for partial updates, so a patch is checked
//! only on the fields it carries.

use docvault_domain::error::{Error, Result};
use docvault_domain::ports::providers::Validator;
use docvault_domain::value_objects::Document;
use serde_json::Value;

/// JSON Schema backed [`Validator`]
pub struct JsonSchemaValidator {
    full: jsonschema::Validator,
    partial: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Compile a schema
    ///
    /// # Errors
    /// `Error::Configuration` if the schema itself is invalid
    pub fn new(schema: &Value) -> Result<Self> {
        let full = compile(schema)?;
        let mut relaxed = schema.clone();
        strip_required(&mut relaxed);
        let partial = compile(&relaxed)?;
        Ok(Self { full, partial })
    }

    fn check(validator: &jsonschema::Validator, data: &Document) -> Result<()> {
        let instance = Value::Object(data.clone());
        let issues: Vec<String> = validator
            .iter_errors(&instance)
            .map(|error| error.to_string())
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(
                format!("Document failed validation with {} issue(s)", issues.len()),
                issues,
            ))
        }
    }
}

fn compile(schema: &Value) -> Result<jsonschema::Validator> {
    jsonschema::validator_for(schema)
        .map_err(|e| Error::configuration(format!("Invalid JSON schema: {e}")))
}

fn strip_required(schema: &mut Value) {
    match schema {
        Value::Object(map) => {
            if map.get("required").is_some_and(Value::is_array) {
                map.remove("required");
            }
            map.values_mut().for_each(strip_required);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_required),
        _ => {}
    }
}

impl Validator for JsonSchemaValidator {
    fn validate(&self, data: &Document) -> Result<()> {
        Self::check(&self.full, data)
    }

    fn validate_partial(&self, data: &Document) -> Result<()> {
        Self::check(&self.partial, data)
    }
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}
