use loadmod_core::layout::{find_gaps, LayoutOptions};
use loadmod_core::model::{Section, SymbolRecord};

fn sym(name: &str, address: u64, size: u64) -> SymbolRecord {
    SymbolRecord {
        name: name.to_string(),
        address,
        size,
        section: Section::Text,
        module: "lib.so".to_string(),
    }
}

/// The worked example: ranges [0,100), a zero-sized symbol at 100, and
/// [300,350) with threshold 50 yield exactly one finding of 200 bytes
/// between the second and third symbols.
#[test]
fn single_gap_above_threshold_is_the_only_finding() {
    let symbols = vec![sym("one", 0, 100), sym("two", 100, 0), sym("three", 300, 50)];
    let options = LayoutOptions { threshold: 50, sections: vec![Section::Text] };

    let findings = find_gaps(&symbols, &options);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].gap, 200);
    assert_eq!(findings[0].prev_name, "two");
    assert_eq!(findings[0].next_name, "three");
}

/// Analysis is a pure function of the current records: running it again
/// over the same input reproduces identical findings, with no accumulated
/// history from the first pass.
#[test]
fn analysis_is_idempotent_over_identical_input() {
    let symbols =
        vec![sym("a", 0x1000, 0x80), sym("b", 0x1100, 0x10), sym("c", 0x2000, 0x40)];
    let options = LayoutOptions { threshold: 32, sections: vec![Section::Text] };

    let first = find_gaps(&symbols, &options);
    let second = find_gaps(&symbols, &options);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

/// Symbols arriving out of address order are still analyzed in address
/// order; the sort must not disturb input order among equal addresses.
#[test]
fn out_of_order_input_is_sorted_by_address() {
    let symbols = vec![sym("late", 0x3000, 0x10), sym("early", 0x1000, 0x10)];
    let options = LayoutOptions { threshold: 0x100, sections: vec![Section::Text] };

    let findings = find_gaps(&symbols, &options);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].prev_name, "early");
    assert_eq!(findings[0].next_name, "late");
}

/// A rendered finding names both bounding symbols and the gap size.
#[test]
fn finding_render_mentions_both_symbols_and_gap() {
    let symbols = vec![sym("first", 0, 8), sym("second", 0x100, 8)];
    let options = LayoutOptions::default();
    let findings = find_gaps(&symbols, &options);
    assert_eq!(findings.len(), 1);

    let line = findings[0].render();
    assert!(line.contains("`first`"));
    assert!(line.contains("`second`"));
    assert!(line.contains("248 bytes"));
    assert!(line.starts_with("possible padding"));
}
