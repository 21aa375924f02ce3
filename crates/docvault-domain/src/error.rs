//! Repository errors
//!
//! [`Error`] carries detail for logs; [`ErrorKind`] is the stable category
//! callers branch on.

use std::fmt;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Stable error categories surfaced to callers of the repository
///
/// Each kind maps to a stable code via [`ErrorKind::code`] so the service
/// layer can translate failures without inspecting messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or soft-deleted document
    NotFound,
    /// Tenant-isolation violation or failed access pre-check
    PermissionDenied,
    /// Optimistic-lock mismatch or transactional precondition failure
    FailedPrecondition,
    /// Optimistic-retry budget exhausted or unresolvable contention
    Aborted,
    /// Schema rejection
    ValidationFailed,
    /// Create of an id that is already taken
    AlreadyExists,
    /// Malformed caller input (cursor, options, payload shape)
    InvalidArgument,
    /// Uncategorized database or infrastructure error
    Unknown,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind
    pub fn code(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Main error type for docvault
#[derive(Error, Debug)]
pub enum Error {
    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Tenant isolation violation or denied access
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Description of the violation
        message: String,
    },

    /// Precondition on the stored document did not hold
    #[error("Failed precondition: {message}")]
    FailedPrecondition {
        /// Description of the failed precondition
        message: String,
    },

    /// Operation gave up under contention
    #[error("Aborted: {message}")]
    Aborted {
        /// Description of the abort reason
        message: String,
    },

    /// Schema validation rejected the data
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Summary of the rejection
        message: String,
        /// Individual schema issues
        issues: Vec<String>,
    },

    /// Document already exists
    #[error("Already exists: {resource}")]
    AlreadyExists {
        /// The resource that already exists
        resource: String,
    },

    /// Invalid argument provided to a function
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// The store needs a composite index to serve the query
    #[error("Missing index: {message}")]
    MissingIndex {
        /// Store message, including the index definition to create
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Database-related error
    #[error("Database error: {message}")]
    Database {
        /// Description of the database error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },

    /// Cache operation error
    #[error("Cache error: {message}")]
    Cache {
        /// Description of the cache error
        message: String,
    },

    /// Encryption or decryption error
    #[error("Crypto error: {message}")]
    Crypto {
        /// Description of the crypto error
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },

    /// Infrastructure operation error
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<BoxedSource>,
    },
}

impl Error {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::FailedPrecondition { .. } | Self::MissingIndex { .. } => {
                ErrorKind::FailedPrecondition
            }
            Self::Aborted { .. } => ErrorKind::Aborted,
            Self::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::Json { .. }
            | Self::Configuration { .. }
            | Self::Database { .. }
            | Self::Cache { .. }
            | Self::Crypto { .. }
            | Self::Internal { .. }
            | Self::Infrastructure { .. } => ErrorKind::Unknown,
        }
    }

    /// Stable code of this error's kind
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }

    /// Message safe to show to end users (no internals, no sources)
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::NotFound => "The requested record does not exist".to_string(),
            ErrorKind::PermissionDenied => "Access to this record is not allowed".to_string(),
            ErrorKind::FailedPrecondition => {
                "The record was modified by someone else; reload and try again".to_string()
            }
            ErrorKind::Aborted => "The operation could not complete due to contention".to_string(),
            ErrorKind::ValidationFailed | ErrorKind::InvalidArgument => self.to_string(),
            ErrorKind::AlreadyExists => "A record with this id already exists".to_string(),
            ErrorKind::Unknown => "An unexpected error occurred".to_string(),
        }
    }

    /// Whether an optimistic retry may resolve this error
    pub fn is_contention(&self) -> bool {
        matches!(self.kind(), ErrorKind::FailedPrecondition | ErrorKind::Aborted)
            && !matches!(self, Self::MissingIndex { .. })
    }
}

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

fn boxed<E: std::error::Error + Send + Sync + 'static>(source: E) -> Option<BoxedSource> {
    Some(Box::new(source))
}

/// Constructors, one per variant
impl Error {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::FailedPrecondition {
            message: message.into(),
        }
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self::Aborted {
            message: message.into(),
        }
    }

    /// Schema rejection carrying one entry per failed rule
    pub fn validation(message: impl Into<String>, issues: Vec<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
            issues,
        }
    }

    pub fn already_exists(resource: impl Into<String>) -> Self {
        Self::AlreadyExists {
            resource: resource.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn missing_index(message: impl Into<String>) -> Self {
        Self::MissingIndex {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    pub fn configuration_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Configuration {
            message: message.into(),
            source: boxed(source),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    pub fn database_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Database {
            message: message.into(),
            source: boxed(source),
        }
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: None,
        }
    }

    pub fn infrastructure_with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Infrastructure {
            message: message.into(),
            source: boxed(source),
        }
    }
}
