//! # Chain Links
//!
//! Each record points at the fingerprint of the issuer's previous record.
//! A record without a link is the first record the issuer ever produced;
//! whether that is acceptable depends on the operation kind and is decided
//! by the serializer, not here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::invoice::InvoiceEvent;

/// Reference to the previous record in an issuer's chain (`RegistroAnterior`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainLink {
    /// Tax id of the issuer of the previous record.
    pub issuer_id: String,
    /// Series and number of the previous invoice.
    pub invoice_number: String,
    /// Issue date of the previous invoice.
    pub issue_date: NaiveDate,
    /// Fingerprint (`Huella`) of the previous record.
    pub prior_fingerprint: String,
}

impl ChainLink {
    /// Link to `previous`, the record submitted immediately before.
    pub fn to_previous(previous: &InvoiceEvent) -> Self {
        Self {
            issuer_id: previous.invoice_id.issuer_id.clone(),
            invoice_number: previous.invoice_id.invoice_number.clone(),
            issue_date: previous.invoice_id.issue_date,
            prior_fingerprint: previous.fingerprint.clone(),
        }
    }
}
