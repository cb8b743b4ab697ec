//! Classification of provider responses into [`ProviderError`]
//!
//! | status        | outcome                                                  |
//! |---------------|----------------------------------------------------------|
//! | 200-299       | not an error                                             |
//! | 400-499       | `BadRequest` with the envelope message, when decodable   |
//! | 400-499       | `Internal` embedding the raw body, otherwise             |
//! | anything else | `Internal` carrying status and raw body                  |

use core_kernel::ProviderError;

use crate::transport::TransportError;
use crate::wire::ErrorEnvelope;

/// Classifies a completed response
///
/// # Arguments
///
/// * `status` - HTTP status code
/// * `body` - Raw response body
///
/// # Returns
///
/// `None` for a 2xx status, otherwise the classified error
pub fn map_response(status: u16, body: &str) -> Option<ProviderError> {
    match status {
        200..=299 => None,
        400..=499 => Some(match serde_json::from_str::<ErrorEnvelope>(body) {
            Ok(envelope) => ProviderError::BadRequest {
                status,
                message: envelope.message,
            },
            Err(_) => ProviderError::Internal {
                message: format!("unexpected client error: {body}"),
                status: Some(status),
                body: Some(body.to_string()),
            },
        }),
        _ => Some(ProviderError::Internal {
            message: format!("unexpected provider response (status {status}): {body}"),
            status: Some(status),
            body: Some(body.to_string()),
        }),
    }
}

/// Classifies a failure that happened before a response was received
pub fn map_transport(error: TransportError) -> ProviderError {
    ProviderError::transport(error.to_string())
}

/// Classifies a 2xx body that did not match the expected shape
pub(crate) fn map_decode(status: u16, body: &str, error: serde_json::Error) -> ProviderError {
    ProviderError::Internal {
        message: format!("failed to decode provider response: {error}"),
        status: Some(status),
        body: Some(body.to_string()),
    }
}
