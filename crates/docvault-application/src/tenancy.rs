//! Tenant scoping
//!
//! A bound [`TenantScope`] adds an equality filter on the tenant field to
//! every query, stamps the tenant on every create and rejects any document
//! whose tenant field differs with `PermissionDenied`.

use docvault_domain::error::{Error, Result};
use docvault_domain::value_objects::{Document, Filter};
use serde_json::Value;

/// Equality constraint binding a repository to one tenant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    field: String,
    tenant_id: String,
}

impl TenantScope {
    /// Bind `field == tenant_id`
    pub fn new<F: Into<String>, T: Into<String>>(field: F, tenant_id: T) -> Self {
        Self {
            field: field.into(),
            tenant_id: tenant_id.into(),
        }
    }

    /// Tenant field name
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Bound tenant id
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Query filter enforcing the scope
    pub fn filter(&self) -> Filter {
        Filter::eq(self.field.clone(), Value::String(self.tenant_id.clone()))
    }

    /// Whether a stored document belongs to the tenant
    pub fn owns(&self, doc: &Document) -> bool {
        doc.get(&self.field).and_then(Value::as_str) == Some(self.tenant_id.as_str())
    }

    /// Reject a document of another tenant
    pub fn check(&self, doc: &Document, path: &str) -> Result<()> {
        if self.owns(doc) {
            Ok(())
        } else {
            Err(Error::permission_denied(format!(
                "Document {path} is outside tenant scope '{}'",
                self.tenant_id
            )))
        }
    }

    /// Stamp the tenant on new data
    ///
    /// # Errors
    /// `PermissionDenied` if `data` already names a different tenant
    pub fn stamp(&self, data: &mut Document) -> Result<()> {
        match data.get(&self.field) {
            None | Some(Value::Null) => {
                data.insert(self.field.clone(), Value::String(self.tenant_id.clone()));
                Ok(())
            }
            Some(Value::String(existing)) if *existing == self.tenant_id => Ok(()),
            Some(other) => Err(Error::permission_denied(format!(
                "Cannot write {} = {other} from tenant scope '{}'",
                self.field, self.tenant_id
            ))),
        }
    }
}
