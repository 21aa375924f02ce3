//! Unit tests for domain error types

use docvault_domain::{Error, ErrorKind};

#[test]
fn test_not_found_error() {
    let error = Error::not_found("tasks/t1");
    match &error {
        Error::NotFound { resource } => assert_eq!(resource, "tasks/t1"),
        _ => panic!("Expected NotFound error"),
    }
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(error.code(), "NOT_FOUND");
}

#[test]
fn test_validation_error_keeps_issues() {
    let error = Error::validation("Task is invalid", vec!["/title: too short".to_string()]);
    match &error {
        Error::ValidationFailed { message, issues } => {
            assert_eq!(message, "Task is invalid");
            assert_eq!(issues.len(), 1);
        }
        _ => panic!("Expected ValidationFailed error"),
    }
    assert_eq!(error.code(), "VALIDATION_FAILED");
}

#[test]
fn test_missing_index_is_precondition_but_not_contention() {
    let error = Error::missing_index("create index on tasks(status, createdAt)");
    assert_eq!(error.kind(), ErrorKind::FailedPrecondition);
    assert!(!error.is_contention());
    assert!(Error::failed_precondition("stale").is_contention());
    assert!(Error::aborted("conflict").is_contention());
}

#[test]
fn test_infrastructure_errors_map_to_unknown() {
    assert_eq!(Error::cache("down").kind(), ErrorKind::Unknown);
    assert_eq!(Error::database("io").kind(), ErrorKind::Unknown);
    assert_eq!(Error::internal("bug").kind(), ErrorKind::Unknown);
    assert_eq!(Error::crypto("bad tag").kind(), ErrorKind::Unknown);
}

#[test]
fn test_public_message_hides_internals() {
    let error = Error::database_with_source(
        "connection refused at 10.0.0.7:5432",
        std::io::Error::other("refused"),
    );
    let message = error.public_message();
    assert!(!message.contains("10.0.0.7"));
    assert_eq!(message, "An unexpected error occurred");
}

#[test]
fn test_error_codes_are_stable() {
    let expected = [
        (ErrorKind::NotFound, "NOT_FOUND"),
        (ErrorKind::PermissionDenied, "PERMISSION_DENIED"),
        (ErrorKind::FailedPrecondition, "FAILED_PRECONDITION"),
        (ErrorKind::Aborted, "ABORTED"),
        (ErrorKind::ValidationFailed, "VALIDATION_FAILED"),
        (ErrorKind::AlreadyExists, "ALREADY_EXISTS"),
        (ErrorKind::InvalidArgument, "INVALID_ARGUMENT"),
        (ErrorKind::Unknown, "UNKNOWN"),
    ];
    for (kind, code) in expected {
        assert_eq!(kind.code(), code);
        assert_eq!(kind.to_string(), code);
    }
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: Error = json_error.into();
    assert!(matches!(error, Error::Json { .. }));
}
