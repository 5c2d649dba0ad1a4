//! Command-line surface: a single assemble-and-run command, with the
//! global flags carried over from the team's usual CLI shape (verbose
//! logging, an optional config file, color control) even though this
//! tool has no subcommands of its own.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "msc",
    version,
    author,
    about = "Assembles and runs MiniScript VM bytecode text"
)]
pub struct Cli {
    /// Assembly source file. Reads from stdin when omitted.
    pub file: Option<PathBuf>,

    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true, env = "MSC_VERBOSE")]
    pub verbose: bool,

    /// Path to a config file (reserved for future use).
    #[arg(short, long, global = true, env = "MSC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable ANSI color in log output.
    #[arg(long, global = true, env = "MSC_NO_COLOR")]
    pub no_color: bool,

    /// Abort execution after this many VM cycles (0 = unbounded).
    #[arg(long, default_value_t = 0)]
    pub max_cycles: u32,

    /// Print the disassembly of every function instead of running them.
    #[arg(long)]
    pub dump_bytecode: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_argument_is_optional() {
        let cli = Cli::parse_from(["msc"]);
        assert!(cli.file.is_none());
        assert_eq!(cli.max_cycles, 0);
        assert!(!cli.dump_bytecode);
    }

    #[test]
    fn file_argument_and_flags_parse_together() {
        let cli = Cli::parse_from(["msc", "prog.asm", "--verbose", "--max-cycles", "1000", "--dump-bytecode"]);
        assert_eq!(cli.file.unwrap(), PathBuf::from("prog.asm"));
        assert!(cli.verbose);
        assert_eq!(cli.max_cycles, 1000);
        assert!(cli.dump_bytecode);
    }

    #[test]
    fn no_color_defaults_to_false() {
        let cli = Cli::parse_from(["msc"]);
        assert!(!cli.no_color);
    }
}
