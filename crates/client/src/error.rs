//! Client error types.

use serde::Deserialize;
use thiserror::Error;

/// Client result type.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by the API client and the local store.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with a non-success status.
    #[error("API error (status {status}, {code}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable error code from the envelope.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// A body could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The local store failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl ClientError {
    /// HTTP status of an API error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build an API error from a status and a response body.
    ///
    /// Bodies in the `{"error": {"code", "message"}}` envelope are unpacked;
    /// anything else is kept verbatim as the message.
    #[must_use]
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Envelope {
            error: EnvelopeError,
        }

        #[derive(Deserialize)]
        struct EnvelopeError {
            code: String,
            message: String,
        }

        match serde_json::from_str::<Envelope>(body) {
            Ok(envelope) => Self::Api {
                status,
                code: envelope.error.code,
                message: envelope.error.message,
            },
            Err(_) => Self::Api {
                status,
                code: "HTTP_ERROR".to_string(),
                message: body.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Store(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_unpacks_envelope() {
        let err = ClientError::from_response(
            403,
            r#"{"error":{"code":"FORBIDDEN","message":"Forbidden: admin only"}}"#,
        );

        match err {
            ClientError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 403);
                assert_eq!(code, "FORBIDDEN");
                assert_eq!(message, "Forbidden: admin only");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_response_keeps_plain_bodies() {
        let err = ClientError::from_response(502, "Bad Gateway");
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("Bad Gateway"));
    }
}
