//! # Submit — send a batch manifest to the AEAT service.
//!
//! The credential and environment come from `VERIFACTU_*` environment
//! variables (see [`vfx_client::ClientConfig::from_env`]); `--production`
//! forces the production endpoint and cannot be combined with a
//! `VERIFACTU_ENDPOINT` override.
//!
//! ```bash
//! vfx submit demos/first-registration.json --save-request req.xml --save-response reply.xml
//! ```
//!
//! Prints the interpreted response as JSON. Exits with
//! [`crate::EXIT_REJECTED`] if any record was rejected.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use vfx_client::{ClientConfig, Environment, VerifactuClient};

use crate::manifest::BatchManifest;

/// Arguments for `vfx submit`.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Batch manifest (JSON).
    pub manifest: PathBuf,

    /// Submit to production instead of the environment in
    /// `VERIFACTU_ENVIRONMENT`.
    #[arg(long)]
    pub production: bool,

    /// Save the document exactly as sent.
    #[arg(long, value_name = "FILE")]
    pub save_request: Option<PathBuf>,

    /// Save the raw response body.
    #[arg(long, value_name = "FILE")]
    pub save_response: Option<PathBuf>,
}

/// Execute `vfx submit`.
pub fn run_submit(args: &SubmitArgs) -> Result<u8> {
    let manifest = BatchManifest::load(&args.manifest)?;
    let config = ClientConfig::from_env().context("failed to load VERIFACTU_* configuration")?;
    let config = select_environment(config, args.production)?;
    tracing::info!(
        environment = config.environment.as_str(),
        endpoint = config.endpoint(),
        "submitting {}",
        args.manifest.display()
    );
    let client = VerifactuClient::new(&config, manifest.session())
        .context("failed to set up the VERI*FACTU client")?;

    // Fail on caller errors before starting a runtime or touching the network.
    client
        .serialize(&manifest.events)
        .with_context(|| format!("cannot serialize {}", args.manifest.display()))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let submission = runtime
        .block_on(client.send(&manifest.events))
        .context("submission failed")?;

    // Saved before interpreting so a malformed reply is still on disk.
    if let Some(path) = &args.save_request {
        crate::write_file(path, submission.document.as_bytes())?;
    }
    if let Some(path) = &args.save_response {
        crate::write_file(path, &submission.body)?;
    }

    let report = client
        .report(submission)
        .context("unexpected response from the service")?;
    crate::print_json(&report.response)?;

    Ok(if report.all_accepted() {
        0
    } else {
        crate::EXIT_REJECTED
    })
}

/// Apply `--production` to `config`.
///
/// An endpoint override always wins over the environment, so asking for
/// production while one is set is refused rather than silently ignored.
fn select_environment(mut config: ClientConfig, production: bool) -> Result<ClientConfig> {
    if production {
        if let Some(url) = &config.endpoint_override {
            bail!("--production cannot be combined with VERIFACTU_ENDPOINT ({url}); unset one of them");
        }
        config.environment = Environment::Production;
    }
    Ok(config)
}
