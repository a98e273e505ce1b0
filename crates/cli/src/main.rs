use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use lmtool::commands::{
    depgraph_command, disas_command, dmesg_command, layout_command, parse_section,
};
use lmtool::init_tracing;

/// Load-module helper tools.
///
/// This CLI is a thin wrapper around `loadmod-core` (exposed in code as
/// `loadmod_core`). All substantive logic lives in the library so it can be
/// tested thoroughly and reused from other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "lmtool",
    version,
    about = "Helpers for load-module layout analysis and related chores",
    long_about = None
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Heuristically flag padding/layout problems in load modules.
    ///
    /// Parses `objdump -t` output for each module and reports unexplained
    /// gaps between adjacent symbols. Findings are advisory.
    Layout {
        /// Load modules (executables or shared libraries) to analyze.
        #[arg(required = true)]
        modules: Vec<PathBuf>,

        /// Report gaps strictly larger than this many bytes.
        #[arg(long, default_value_t = loadmod_core::layout::DEFAULT_GAP_THRESHOLD)]
        threshold: u64,

        /// Section(s) to analyze (text, data, bss, other). Repeatable.
        #[arg(long = "section", default_values_t = [String::from("text")])]
        sections: Vec<String>,

        /// Hard wall-clock bound in seconds for each objdump invocation.
        #[arg(long)]
        timeout: Option<u64>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the report to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Generate a DOT dependency graph for a set of load modules.
    ///
    /// Parses `objdump -p` NEEDED entries; nodes are modules, edges are
    /// "depends on". Repeated edges are deduplicated. This is a
    /// visualization aid, not a build-order resolver.
    Depgraph {
        /// Load modules whose dependencies should be graphed.
        #[arg(required = true)]
        modules: Vec<PathBuf>,

        /// Hard wall-clock bound in seconds for each objdump invocation.
        #[arg(long)]
        timeout: Option<u64>,

        /// Emit JSON instead of DOT.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Write the graph to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Disassemble one or more functions from one or more load modules.
    ///
    /// Finds each function's address range in the symbol table, then runs a
    /// bounded `objdump -dl` over exactly that range.
    Disas {
        /// Function name to disassemble. Repeatable.
        #[arg(long = "function", short = 'f', required = true)]
        functions: Vec<String>,

        /// Load module to search. Repeatable.
        #[arg(long = "module", short = 'm', required = true)]
        modules: Vec<PathBuf>,

        /// Hard wall-clock bound in seconds for each objdump invocation.
        #[arg(long)]
        timeout: Option<u64>,

        /// Echo the disassembly command instead of executing it.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },

    /// Dump the connected Android device's kernel log with human-readable
    /// timestamps.
    ///
    /// Set `ANDROID_SERIAL` to pick a device when several are attached.
    Dmesg {
        /// Hard wall-clock bound in seconds for each adb invocation.
        #[arg(long)]
        timeout: Option<u64>,

        /// Write the log to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Layout { modules, threshold, sections, timeout, json, output } => {
            let sections = sections
                .iter()
                .map(|s| parse_section(s))
                .collect::<Result<Vec<_>>>()?;
            layout_command(&modules, threshold, &sections, timeout, json, output.as_deref())
        }
        Command::Depgraph { modules, timeout, json, output } => {
            depgraph_command(&modules, timeout, json, output.as_deref())
        }
        Command::Disas { functions, modules, timeout, dry_run } => {
            disas_command(&functions, &modules, timeout, dry_run)
        }
        Command::Dmesg { timeout, output } => dmesg_command(timeout, output.as_deref()),
    }
}
