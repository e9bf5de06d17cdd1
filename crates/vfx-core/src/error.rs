//! # Error Types
//!
//! Errors raised while building domain values and while turning them into
//! a wire document. All errors use `thiserror`.
//!
//! Encoding errors are caller errors: they are raised synchronously, before
//! any network access, and no partial document ever escapes.

use thiserror::Error;

/// A fiscal identity failed its shape checks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// Name is blank.
    #[error("{field} must not be blank")]
    Blank {
        /// Field that was blank.
        field: &'static str,
    },

    /// Name exceeds the schema limit.
    #[error("{field} is {len} characters long, the limit is {max}")]
    TooLong {
        /// Field that was too long.
        field: &'static str,
        /// Actual length in characters.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// Domestic tax id is not 8 or 9 characters.
    #[error("tax id {0:?} must be 8 or 9 characters")]
    InvalidTaxId(String),

    /// Country code is not two uppercase ASCII letters.
    #[error("country code {0:?} must be two uppercase letters")]
    InvalidCountry(String),

    /// Foreign id type code is not in the AEAT list.
    #[error("unknown foreign id type {0:?}")]
    UnknownIdType(String),
}

/// An invoice event violates a structural precondition of the wire format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// The batch holds no records.
    #[error("a submission must contain at least one record")]
    EmptyBatch,

    /// The batch mixes operation kinds.
    #[error("record {index} is a {found} but the batch holds {expected} records")]
    MixedBatch {
        /// Position of the first offending record.
        index: usize,
        /// Operation kind of the first record.
        expected: &'static str,
        /// Operation kind of the offending record.
        found: &'static str,
    },

    /// A substitution or cancellation has no chain link.
    #[error("{operation} of invoice {invoice} requires a chain link to the previous record")]
    MissingChainLink {
        /// Operation kind of the record.
        operation: &'static str,
        /// Invoice number of the record.
        invoice: String,
    },

    /// A corrective substitution does not name the invoice it replaces.
    #[error("corrective substitution of invoice {invoice} does not reference the corrected invoice")]
    MissingCorrectedInvoice {
        /// Invoice number of the record.
        invoice: String,
    },

    /// A corrective invoice does not say how it corrects.
    #[error("corrective invoice {invoice} has no correction kind")]
    MissingCorrectionKind {
        /// Invoice number of the record.
        invoice: String,
    },

    /// Recipient input fits neither the domestic nor the foreign shape.
    #[error("unsupported recipient: {reason}")]
    UnsupportedRecipient {
        /// Why the input fits neither shape.
        reason: String,
    },

    /// Recipient fields fit a shape but fail its identity checks.
    #[error("invalid recipient identity: {0}")]
    InvalidIdentity(#[from] IdentityError),

    /// A taxable breakdown line lacks one of its taxable fields.
    #[error("taxable breakdown line is missing {field}")]
    IncompleteBreakdownLine {
        /// Missing field.
        field: &'static str,
    },

    /// The fingerprint timestamp carries sub-second precision, which the
    /// wire format cannot hold.
    #[error("fingerprint timestamp of invoice {invoice} has fractional seconds")]
    FractionalTimestamp {
        /// Invoice number of the record.
        invoice: String,
    },

    /// The XML writer failed.
    #[error("xml writer error: {0}")]
    Xml(String),
}
