//! # vfx-cli — CLI Tool for VERI*FACTU Submissions
//!
//! Provides the `vfx` command-line interface over `vfx-client`.
//!
//! ## Subcommands
//!
//! - `vfx render` — Serialize a batch manifest to the SOAP document, no network.
//! - `vfx submit` — Serialize, send and interpret a batch.
//! - `vfx interpret` — Interpret a saved response body.
//!
//! ```bash
//! vfx render demos/first-registration.json
//! VERIFACTU_CERT_PATH=cert.p12 VERIFACTU_CERT_PASSWORD=... \
//!     vfx submit demos/first-registration.json --save-response reply.xml
//! vfx interpret reply.xml
//! ```
//!
//! Handlers return the process exit code: `0` when every record was
//! accepted, [`EXIT_REJECTED`] when at least one record was rejected.

pub mod interpret;
pub mod manifest;
pub mod render;
pub mod submit;

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

/// Exit code when the service rejected at least one record.
pub const EXIT_REJECTED: u8 = 2;

/// Write `bytes` to `path`, naming the file in the error.
pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode output as JSON")?;
    println!("{json}");
    Ok(())
}
