//! # vfx CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Logs go to stderr so `vfx render` can write the document to stdout.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vfx_cli::interpret::{run_interpret, InterpretArgs};
use vfx_cli::render::{run_render, RenderArgs};
use vfx_cli::submit::{run_submit, SubmitArgs};

/// VERI*FACTU submission tool.
///
/// Renders batch manifests into AEAT `RegFactuSistemaFacturacion`
/// documents, submits them over mutual TLS and interprets the replies.
#[derive(Parser, Debug)]
#[command(name = "vfx", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serialize a batch manifest to the SOAP document without sending it.
    Render(RenderArgs),

    /// Serialize, send and interpret a batch manifest.
    Submit(SubmitArgs),

    /// Interpret a saved response body.
    Interpret(InterpretArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!("vfx CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Render(args) => run_render(&args),
        Commands::Submit(args) => run_submit(&args),
        Commands::Interpret(args) => run_interpret(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
