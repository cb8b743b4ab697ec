//! Custom Test Assertions
//!
//! Assertion helpers for `ProviderError` that print the full error on
//! mismatch.

use core_kernel::{ProviderError, ProviderErrorKind};

/// Asserts that a result failed with the given error kind
///
/// # Panics
///
/// Panics if the result is `Ok` or the kind differs
pub fn assert_provider_error_kind<T: std::fmt::Debug>(
    result: &Result<T, ProviderError>,
    expected: ProviderErrorKind,
) {
    match result {
        Err(error) => assert_eq!(
            error.kind(),
            expected,
            "Expected {:?} error, got {:?}",
            expected,
            error
        ),
        Ok(value) => panic!("Expected {:?} error, got Ok({:?})", expected, value),
    }
}

/// Asserts that an error is a bad request carrying the provider message verbatim
pub fn assert_bad_request(error: &ProviderError, status: u16, message: &str) {
    match error {
        ProviderError::BadRequest {
            status: actual_status,
            message: actual_message,
        } => {
            assert_eq!(*actual_status, status, "Status mismatch in {:?}", error);
            assert_eq!(actual_message, message, "Message mismatch in {:?}", error);
        }
        other => panic!("Expected BadRequest, got {:?}", other),
    }
}

/// Asserts that an error is internal and kept the raw upstream body
pub fn assert_internal_with_body(error: &ProviderError, body: &str) {
    assert_eq!(
        error.kind(),
        ProviderErrorKind::Internal,
        "Expected Internal error, got {:?}",
        error
    );
    assert_eq!(error.raw_body(), Some(body), "Raw body mismatch in {:?}", error);
}
