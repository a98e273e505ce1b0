//! End-to-end symbol pipeline against canned `objdump -t` output, using the
//! `LMTOOL_FAKE_SYMTAB` seam so no toolchain needs to be installed.
//!
//! Kept as the single env-mutating test in this binary; integration test
//! binaries run in their own process, so this cannot race other files.

use std::fs;

use loadmod_core::invoke::ToolInvoker;
use loadmod_core::layout::{find_gaps, LayoutOptions};
use loadmod_core::model::Section;
use loadmod_core::symtab::{dump_symbols, FAKE_SYMTAB_ENV};
use tempfile::tempdir;

const DUMP: &str = "\
libdemo.so:     file format elf64-x86-64

SYMBOL TABLE:
0000000000001000 g     F .text\t0000000000000080              alpha
0000000000001080 g     F .text\t0000000000000010              beta
0000000000001200 g     F .text\t0000000000000040              gamma
";

#[test]
fn fake_symtab_feeds_the_layout_pipeline() {
    let dir = tempdir().expect("tempdir");
    let fake = dir.path().join("symtab.txt");
    fs::write(&fake, DUMP).expect("write fake");

    std::env::set_var(FAKE_SYMTAB_ENV, &fake);

    let invoker = ToolInvoker::new();
    let symbols =
        dump_symbols(&invoker, std::path::Path::new("libdemo.so")).expect("fake dump");
    assert_eq!(symbols.len(), 3);

    // beta ends at 0x1090, gamma starts at 0x1200: a 0x170-byte gap.
    let options = LayoutOptions { threshold: 0x100, sections: vec![Section::Text] };
    let findings = find_gaps(&symbols, &options);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].prev_name, "beta");
    assert_eq!(findings[0].next_name, "gamma");
    assert_eq!(findings[0].gap, 0x170);

    std::env::remove_var(FAKE_SYMTAB_ENV);
}
