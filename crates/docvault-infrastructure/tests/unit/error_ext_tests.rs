//! Foreign error wrapping

use docvault_domain::error::{Error, Result};
use docvault_infrastructure::error_ext::ErrorContext;
use std::error::Error as _;
use std::io;

#[test]
fn test_io_context_keeps_source() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");

    let result: Result<()> = Err(io_error).io_context("failed to read file");
    match result {
        Err(Error::Infrastructure { message, source }) => {
            assert!(message.starts_with("I/O: failed to read file"));
            assert!(source.is_some());
        }
        other => panic!("Expected Infrastructure error, got {other:?}"),
    }
}

#[test]
fn test_config_context() {
    let parsed: std::result::Result<u32, _> = "x".parse::<u32>();
    let err = parsed.config_context("port").unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(err.source().is_some());
}

#[test]
fn test_plain_context_formats_step() {
    let attempt = 3;
    let err = Err::<(), _>(io::Error::other("boom"))
        .context(format!("startup attempt {attempt}"))
        .unwrap_err();
    assert!(matches!(err, Error::Infrastructure { .. }));
    assert!(err.to_string().contains("startup attempt 3: boom"));
}

#[test]
fn test_ok_passes_through() {
    let value: Result<u8> = Ok::<u8, io::Error>(7).context("unused");
    assert_eq!(value.unwrap(), 7);
}
