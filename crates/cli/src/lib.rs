//! Shared helpers for the `lmtool` CLI.
//!
//! Command bodies live in [`commands`] so the binary stays a thin argument
//! router and the integration tests can call commands directly.

use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

pub mod commands;

/// Write report text to the named file, or to stdout when no destination
/// was given.
pub fn write_output(dest: Option<&Path>, body: &str) -> Result<()> {
    match dest {
        Some(path) => fs::write(path, body)
            .with_context(|| format!("failed to write output to {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(body.as_bytes()).context("failed to write to stdout")?;
            Ok(())
        }
    }
}

/// Initialize tracing from `-v` repetition, deferring to `RUST_LOG` when it
/// is set.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
