//! # Render — serialize a batch manifest without sending it.
//!
//! ```bash
//! vfx render demos/first-registration.json
//! vfx render demos/cancellation.json --out request.xml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::manifest::BatchManifest;

/// Arguments for `vfx render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Batch manifest (JSON).
    pub manifest: PathBuf,

    /// Write the document here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Execute `vfx render`.
pub fn run_render(args: &RenderArgs) -> Result<u8> {
    let manifest = BatchManifest::load(&args.manifest)?;
    let session = manifest.session();
    let document = vfx_client::wire::serialize(
        &session.submitter,
        session.representative.as_ref(),
        &session.system,
        &manifest.events,
    )
    .with_context(|| format!("cannot serialize {}", args.manifest.display()))?;

    match &args.out {
        Some(path) => {
            crate::write_file(path, document.as_bytes())?;
            tracing::info!(
                path = %path.display(),
                records = document.record_count(),
                "document written"
            );
        }
        None => println!("{}", document.as_str()),
    }
    Ok(0)
}
