//! # Interpret — read a saved response body.
//!
//! ```bash
//! vfx interpret reply.xml
//! vfx interpret reply.xml --manifest demos/first-registration.json
//! ```
//!
//! With `--manifest`, outcomes are also checked one-to-one against the
//! manifest's events.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use vfx_core::InvoiceId;

use crate::manifest::BatchManifest;

/// Arguments for `vfx interpret`.
#[derive(Args, Debug)]
pub struct InterpretArgs {
    /// Raw response body as saved by `vfx submit --save-response`.
    pub response: PathBuf,

    /// Manifest the response answers, to check outcome order.
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

/// Execute `vfx interpret`.
pub fn run_interpret(args: &InterpretArgs) -> Result<u8> {
    let body = std::fs::read(&args.response)
        .with_context(|| format!("failed to read {}", args.response.display()))?;
    let response = vfx_client::response::interpret(&body)
        .with_context(|| format!("cannot interpret {}", args.response.display()))?;

    if let Some(path) = &args.manifest {
        let manifest = BatchManifest::load(path)?;
        let submitted: Vec<InvoiceId> = manifest.events.iter().map(|e| e.invoice_id.clone()).collect();
        vfx_client::response::reconcile(&submitted, &response.outcomes)
            .with_context(|| format!("response does not answer {}", path.display()))?;
    }

    crate::print_json(&response)?;
    Ok(if response.all_accepted() {
        0
    } else {
        crate::EXIT_REJECTED
    })
}
