//! Batch manifest: the JSON input of `vfx render` and `vfx submit`.
//!
//! ```json
//! {
//!   "submitter": { "name": "Comercial Ejemplo SL", "tax_id": "B12345678" },
//!   "representative": null,
//!   "system": { "vendor_name": "...", "verifactu_only": true, ... },
//!   "events": [ { "operation": "registration", ... } ]
//! }
//! ```
//!
//! Amounts are JSON strings (`"100.00"`) so their scale survives parsing.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use vfx_client::Session;
use vfx_core::{FiscalIdentity, InvoiceEvent, SystemDescriptor};

/// One submission: who submits, from which system, and the records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchManifest {
    pub submitter: FiscalIdentity,
    #[serde(default)]
    pub representative: Option<FiscalIdentity>,
    pub system: SystemDescriptor,
    pub events: Vec<InvoiceEvent>,
}

impl BatchManifest {
    /// Load and parse a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&raw)
            .with_context(|| format!("invalid manifest {}", path.display()))?;
        ensure!(
            !manifest.events.is_empty(),
            "manifest {} contains no events",
            path.display()
        );
        tracing::debug!(
            path = %path.display(),
            events = manifest.events.len(),
            "loaded batch manifest"
        );
        Ok(manifest)
    }

    pub fn session(&self) -> Session {
        Session {
            submitter: self.submitter.clone(),
            representative: self.representative.clone(),
            system: self.system.clone(),
        }
    }
}
