//! Client error types.
//!
//! Three failure classes never mix: encoding errors (caller input, raised
//! before any network access), transport errors (the request never produced
//! a usable reply) and protocol violations (a reply arrived but does not fit
//! the response schema). [`ClientError`] unifies them for the facade.

pub use vfx_core::EncodingError;

/// The submission did not complete at the HTTP level.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The client credential could not be turned into a TLS identity.
    #[error("client credential rejected: {reason}")]
    Credential { reason: String },

    /// Connection, TLS or timeout failure.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The service answered with a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body could not be read.
    #[error("failed to read response body from {endpoint}: {source}")]
    Body {
        endpoint: String,
        source: reqwest::Error,
    },
}

/// A response arrived but does not match the response schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    /// The body is not well-formed XML.
    #[error("malformed response: {reason}")]
    Malformed { reason: String },

    /// A required element is absent.
    #[error("response is missing {element}")]
    MissingElement { element: &'static str },

    /// An element holds a value outside its code list.
    #[error("unexpected value {value:?} in {element}")]
    InvalidValue {
        element: &'static str,
        value: String,
    },

    /// The service answered with a SOAP fault.
    #[error("SOAP fault {code}: {message}")]
    Fault { code: String, message: String },

    /// The number of outcomes differs from the number of submitted records.
    #[error("submitted {expected} records but received {actual} outcomes")]
    OutcomeCountMismatch { expected: usize, actual: usize },

    /// An outcome refers to a different invoice than the record at its
    /// position.
    #[error("outcome {index} refers to {actual}, expected {expected}")]
    OutcomeOutOfOrder {
        index: usize,
        expected: String,
        actual: String,
    },
}

/// Any failure of [`crate::VerifactuClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
}

impl ClientError {
    /// Caller errors are the only ones that retrying the same input cannot
    /// fix.
    pub fn is_encoding(&self) -> bool {
        matches!(self, Self::Encoding(_))
    }
}
