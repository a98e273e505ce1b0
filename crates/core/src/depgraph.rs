//! Dependency graph construction from `objdump -p` dynamic-section output.
//!
//! Nodes are load modules, edges are the `NEEDED` entries discovered for
//! each module. The graph is a visualization aid rendered as DOT; there is
//! no cycle detection or topological ordering.

use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::ffi::OsStr;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Serialize;

use crate::invoke::{objdump_path, InvokeError, ToolInvoker};
use crate::symtab::ParseError;

/// Environment variable naming a file whose contents stand in for
/// `objdump -p` stdout in tests.
pub const FAKE_DYNINFO_ENV: &str = "LMTOOL_FAKE_DYNINFO";

#[derive(Debug, thiserror::Error)]
pub enum DepGraphError {
    #[error("load module not found at {0}")]
    MissingModule(std::path::PathBuf),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

fn needed_line_regex() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*NEEDED\s+(?P<dep>\S+)\s*$").unwrap())
}

/// Extract `NEEDED` sonames from `objdump -p` output, preserving order and
/// repeats (the graph deduplicates, the parser does not).
///
/// A module with no dynamic section legitimately has zero deps, so absence
/// of `NEEDED` lines is not an error; output that does not even carry the
/// `file format` banner is treated as an incompatible format.
pub fn parse_needed(output: &str) -> Result<Vec<String>, ParseError> {
    if !output.trim().is_empty() && !output.contains("file format") {
        return Err(ParseError::NoRecords { tool: "objdump -p".to_string() });
    }
    Ok(output
        .lines()
        .filter_map(|line| needed_line_regex().captures(line))
        .map(|caps| caps["dep"].to_string())
        .collect())
}

/// Run `objdump -p` on a load module (or read the test fake) and return its
/// direct dependencies.
pub fn dump_needed(invoker: &ToolInvoker, module: &Path) -> Result<Vec<String>, DepGraphError> {
    if let Some(fake) = env::var_os(FAKE_DYNINFO_ENV) {
        let body = fs::read_to_string(&fake).map_err(|source| {
            DepGraphError::Invoke(InvokeError::Io {
                tool: format!("{FAKE_DYNINFO_ENV} fake"),
                source,
            })
        })?;
        return Ok(parse_needed(&body)?);
    }

    if !module.is_file() {
        return Err(DepGraphError::MissingModule(module.to_path_buf()));
    }

    let objdump = objdump_path();
    let output = invoker.run(objdump.as_os_str(), [OsStr::new("-p"), module.as_os_str()])?;
    Ok(parse_needed(&output)?)
}

/// Directed "depends on" graph over load modules. Edge insertion
/// deduplicates; iteration order is deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DepGraph {
    modules: BTreeMap<String, BTreeSet<String>>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a module node, with or without dependencies.
    pub fn add_module(&mut self, name: &str) {
        self.modules.entry(name.to_string()).or_default();
    }

    /// Record that `module` depends on `dep`. Returns false when the edge
    /// was already present.
    pub fn add_dep(&mut self, module: &str, dep: &str) -> bool {
        self.modules.entry(module.to_string()).or_default().insert(dep.to_string())
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn edge_count(&self) -> usize {
        self.modules.values().map(|deps| deps.len()).sum()
    }

    /// Serialize the graph in DOT form for a standard renderer.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph deps {\n");
        out.push_str("  rankdir=LR;\n");
        for name in self.modules.keys() {
            let _ = writeln!(out, "  \"{}\";", dot_escape(name));
        }
        for (name, deps) in &self.modules {
            for dep in deps {
                let _ = writeln!(out, "  \"{}\" -> \"{}\";", dot_escape(name), dot_escape(dep));
            }
        }
        out.push_str("}\n");
        out
    }
}

fn dot_escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}
