use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use loadmod_core::dmesg::rewritten_dmesg;
use loadmod_core::invoke::ToolInvoker;

use crate::write_output;

/// Dump the connected device's kernel log with human-readable timestamps.
///
/// Device selection follows `ANDROID_SERIAL` when several devices are
/// attached.
pub fn dmesg_command(timeout_secs: Option<u64>, output: Option<&Path>) -> Result<()> {
    let invoker = ToolInvoker::with_timeout(timeout_secs.map(Duration::from_secs));
    let lines = rewritten_dmesg(&invoker).context("failed to read device kernel log")?;

    let mut body = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in &lines {
        body.push_str(line);
        body.push('\n');
    }
    write_output(output, &body)
}
