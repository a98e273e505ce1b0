//! Layout gap analysis over parsed symbol records.
//!
//! For each adjacent pair of symbols (sorted by address, ties kept in input
//! order) the analyzer computes the unexplained space between one symbol's
//! end and the next symbol's start, and flags gaps above a threshold as
//! possible padding. Findings are advisory; this is a heuristic, not a
//! correctness proof.

use crate::model::{GapFinding, Section, SymbolRecord};

/// Default gap threshold in bytes. Chosen to sit above common 16-byte
/// function alignment padding so only unusual gaps are flagged.
pub const DEFAULT_GAP_THRESHOLD: u64 = 32;

#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Gaps strictly larger than this many bytes are reported.
    pub threshold: u64,
    /// Sections whose symbols participate in the analysis.
    pub sections: Vec<Section>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self { threshold: DEFAULT_GAP_THRESHOLD, sections: vec![Section::Text] }
    }
}

/// Detect gaps between adjacent symbols.
///
/// The input order of equal-address symbols is preserved (stable sort), so
/// findings are deterministic for a given dump. Zero-sized symbols are kept;
/// they can still bound a gap.
pub fn find_gaps(symbols: &[SymbolRecord], options: &LayoutOptions) -> Vec<GapFinding> {
    let mut selected: Vec<&SymbolRecord> =
        symbols.iter().filter(|s| options.sections.contains(&s.section)).collect();
    selected.sort_by_key(|s| s.address);

    let mut findings = Vec::new();
    for pair in selected.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let prev_end = prev.address.saturating_add(prev.size);
        // Overlapping symbols (aliases, ifuncs) produce no gap.
        let gap = next.address.saturating_sub(prev_end);
        if gap > options.threshold {
            findings.push(GapFinding {
                module: prev.module.clone(),
                prev_name: prev.name.clone(),
                prev_end,
                next_name: next.name.clone(),
                next_address: next.address,
                gap,
            });
        }
    }
    findings
}

/// Render the per-module report header. Output is labeled as heuristic so
/// nobody mistakes it for an exhaustive layout audit.
pub fn report_header(module: &str, findings: usize, options: &LayoutOptions) -> String {
    format!(
        "heuristic layout report for {}: {} finding(s) with gap > {} bytes",
        module, findings, options.threshold
    )
}
