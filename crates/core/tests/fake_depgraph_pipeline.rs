//! Dependency-graph pipeline against canned `objdump -p` output via the
//! `LMTOOL_FAKE_DYNINFO` seam.

use std::fs;
use std::path::Path;

use loadmod_core::depgraph::{dump_needed, DepGraph, FAKE_DYNINFO_ENV};
use loadmod_core::invoke::ToolInvoker;
use tempfile::tempdir;

const DYN_OUTPUT: &str = "\
liba.so:     file format elf64-x86-64

Dynamic Section:
  NEEDED               libb.so
  NEEDED               libb.so
  NEEDED               libc.so.6
  SONAME               liba.so
";

#[test]
fn repeated_needed_entries_collapse_to_one_edge() {
    let dir = tempdir().expect("tempdir");
    let fake = dir.path().join("dyninfo.txt");
    fs::write(&fake, DYN_OUTPUT).expect("write fake");

    std::env::set_var(FAKE_DYNINFO_ENV, &fake);

    let invoker = ToolInvoker::new();
    let deps = dump_needed(&invoker, Path::new("liba.so")).expect("fake dump");
    assert_eq!(deps.len(), 3, "parser reports repeats; the graph deduplicates");

    let mut graph = DepGraph::new();
    graph.add_module("liba.so");
    for dep in &deps {
        graph.add_dep("liba.so", dep);
    }
    assert_eq!(graph.edge_count(), 2);

    let dot = graph.to_dot();
    assert_eq!(dot.matches("\"liba.so\" -> \"libb.so\";").count(), 1);
    assert_eq!(dot.matches("\"liba.so\" -> \"libc.so.6\";").count(), 1);

    std::env::remove_var(FAKE_DYNINFO_ENV);
}
