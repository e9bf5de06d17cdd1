//! Billing-system descriptor (`SistemaInformatico`).

use serde::{Deserialize, Serialize};

/// The invoicing software that produced the records.
///
/// Supplied once per session and embedded verbatim into every record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDescriptor {
    /// Legal name of the software vendor.
    pub vendor_name: String,
    /// Tax id of the software vendor.
    pub vendor_tax_id: String,
    /// Commercial name of the system.
    pub system_name: String,
    /// Two-character system id assigned by the vendor.
    pub system_id: String,
    pub version: String,
    /// Installation number of this deployment.
    pub installation_number: String,
    /// The system can only operate in VERI*FACTU mode.
    pub verifactu_only: bool,
    /// The system can hold records for more than one taxpayer.
    pub supports_multiple_taxpayers: bool,
    /// The system currently holds records for more than one taxpayer.
    pub has_multiple_taxpayers: bool,
}
