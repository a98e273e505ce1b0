//! loadmod-core
//!
//! Core library behind the `lmtool` command-line helpers for load-module
//! work: symbol-table parsing, layout gap analysis, dependency graphing,
//! single-function disassembly, and dmesg timestamp rewriting.
//!
//! Every tool here is a one-way pipeline: invoke an external command
//! (`objdump`, `adb`), parse its text output into records, run a small
//! analysis over the records, and render a report. All substantive logic
//! lives in this crate so it is fully testable without the external tools
//! installed (see the `LMTOOL_FAKE_*` seams in each pipeline module).

pub mod model;
pub mod invoke;
pub mod symtab;
pub mod layout;
pub mod depgraph;
pub mod disas;
pub mod dmesg;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
