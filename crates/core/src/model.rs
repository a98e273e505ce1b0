//! Transient records shared by the pipeline modules.
//!
//! Records are append-only while a tool's output is being parsed and
//! read-only once analysis starts. Nothing here outlives the process; there
//! is deliberately no persistence layer.

use serde::{Deserialize, Serialize};

/// Coarse section classification for a symbol, derived from the section
/// name in `objdump -t` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Text,
    Data,
    Bss,
    Other,
}

impl Section {
    /// Classify an ELF section name. Anything unrecognized (including the
    /// pseudo-sections `*ABS*` and `*UND*`) maps to `Other`.
    pub fn classify(section_name: &str) -> Section {
        if section_name == ".text" || section_name.starts_with(".text.") {
            Section::Text
        } else if section_name == ".data"
            || section_name.starts_with(".data.")
            || section_name == ".rodata"
            || section_name.starts_with(".rodata.")
        {
            Section::Data
        } else if section_name == ".bss" || section_name.starts_with(".bss.") {
            Section::Bss
        } else {
            Section::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Text => "text",
            Section::Data => "data",
            Section::Bss => "bss",
            Section::Other => "other",
        }
    }
}

/// One parsed symbol-table entry from a load module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub name: String,
    pub address: u64,
    pub size: u64,
    pub section: Section,
    /// Load module the symbol came from (as given on the command line).
    pub module: String,
}

/// A heuristic finding: unexplained space between two adjacent symbols'
/// address ranges. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapFinding {
    pub module: String,
    pub prev_name: String,
    /// End of the preceding symbol's range (address + size).
    pub prev_end: u64,
    pub next_name: String,
    pub next_address: u64,
    /// Size of the gap in bytes.
    pub gap: u64,
}

impl GapFinding {
    /// Render the finding as the one-line report form.
    pub fn render(&self) -> String {
        format!(
            "possible padding: {} bytes between `{}` (ends 0x{:x}) and `{}` (starts 0x{:x}) in {}",
            self.gap, self.prev_name, self.prev_end, self.next_name, self.next_address, self.module
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_recognizes_common_sections() {
        assert_eq!(Section::classify(".text"), Section::Text);
        assert_eq!(Section::classify(".text.unlikely"), Section::Text);
        assert_eq!(Section::classify(".data.rel.ro"), Section::Data);
        assert_eq!(Section::classify(".rodata"), Section::Data);
        assert_eq!(Section::classify(".bss"), Section::Bss);
        assert_eq!(Section::classify("*UND*"), Section::Other);
        assert_eq!(Section::classify(".debug_info"), Section::Other);
    }
}
