use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use loadmod_core::invoke::ToolInvoker;
use loadmod_core::layout::{find_gaps, report_header, LayoutOptions};
use loadmod_core::model::{GapFinding, Section};
use loadmod_core::symtab::dump_symbols;

use crate::write_output;

/// Parse a `--section` value into its classification.
pub fn parse_section(value: &str) -> Result<Section> {
    match value {
        "text" => Ok(Section::Text),
        "data" => Ok(Section::Data),
        "bss" => Ok(Section::Bss),
        "other" => Ok(Section::Other),
        _ => Err(anyhow!("unknown section {value:?} (expected text, data, bss, or other)")),
    }
}

/// Analyze one or more load modules for suspicious layout gaps.
///
/// Targets are processed in sequence; a failing target is reported to
/// stderr and the remaining targets are still attempted, with the whole
/// command exiting non-zero at the end.
pub fn layout_command(
    modules: &[PathBuf],
    threshold: u64,
    sections: &[Section],
    timeout_secs: Option<u64>,
    json: bool,
    output: Option<&Path>,
) -> Result<()> {
    let invoker = ToolInvoker::with_timeout(timeout_secs.map(Duration::from_secs));
    let options = LayoutOptions { threshold, sections: sections.to_vec() };

    let mut all_findings: Vec<GapFinding> = Vec::new();
    let mut body = String::new();
    let mut failed = 0usize;

    for module in modules {
        let symbols = match dump_symbols(&invoker, module) {
            Ok(symbols) => symbols,
            Err(err) => {
                eprintln!("error: {}: {}", module.display(), err);
                failed += 1;
                continue;
            }
        };
        tracing::debug!("parsed {} symbol(s) from {}", symbols.len(), module.display());
        let findings = find_gaps(&symbols, &options);

        if json {
            all_findings.extend(findings);
        } else {
            let mut section = String::new();
            section.push_str(&report_header(
                &module.display().to_string(),
                findings.len(),
                &options,
            ));
            section.push('\n');
            for finding in &findings {
                section.push_str(&finding.render());
                section.push('\n');
            }
            if output.is_some() {
                body.push_str(&section);
            } else {
                // Flush per target so earlier results survive a later failure.
                print!("{section}");
            }
        }
    }

    if json {
        let serialized = serde_json::to_string_pretty(&all_findings)
            .context("failed to serialize findings to JSON")?;
        body = serialized;
        body.push('\n');
        write_output(output, &body)?;
    } else if output.is_some() {
        write_output(output, &body)?;
    }

    if failed > 0 {
        return Err(anyhow!("{failed} of {} target(s) failed", modules.len()));
    }
    Ok(())
}
