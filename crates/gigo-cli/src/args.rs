//! Command-line argument definitions for the gigo CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the command, the input files, an
//! optional symbol to print, the output path, the configuration file and
//! the logging verbosity.

use std::str::FromStr;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// What to print for every input file.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print the parsed source text
    #[value(alias = "s")]
    Str,

    /// Pretty-print the parsed tree structure
    #[value(alias = "d")]
    Dump,

    /// Expand templates and print the generated source
    #[value(alias = "g")]
    Gen,
}

/// Command-line arguments for the gigo compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Command to run
    #[arg(value_enum)]
    pub command: Command,

    /// Source files, grouped by package and processed in order
    #[arg(required = true, help = "Paths to the input files")]
    pub files: Vec<String>,

    /// Only print the first declaration with this name
    #[arg(long)]
    pub symbol: Option<String>,

    /// Output file, stdout when absent
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = parse_log_level)]
    pub log_level: LevelFilter,
}

impl Command {
    /// Whether the command expands templates before printing.
    pub fn mutates(self) -> bool {
        matches!(self, Command::Gen)
    }
}

fn parse_log_level(value: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(value).map_err(|_| {
        format!("invalid log level `{value}`, expected one of off, error, warn, info, debug, trace")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_aliases() {
        let args = Args::parse_from(["gigo", "g", "a.gigo.go", "b.gigo.go"]);
        assert_eq!(args.command, Command::Gen);
        assert_eq!(args.files, vec!["a.gigo.go", "b.gigo.go"]);
        assert_eq!(args.log_level, LevelFilter::Info);
        assert!(args.output.is_none());

        let args = Args::parse_from(["gigo", "dump", "a.gigo.go", "--symbol", "Todo", "-o", "out.txt"]);
        assert_eq!(args.command, Command::Dump);
        assert_eq!(args.symbol.as_deref(), Some("Todo"));
        assert_eq!(args.output.as_deref(), Some("out.txt"));
    }

    #[test]
    fn test_log_level_is_checked() {
        let args = Args::parse_from(["gigo", "str", "a.gigo.go", "--log-level", "TRACE"]);
        assert_eq!(args.log_level, LevelFilter::Trace);

        let err = Args::try_parse_from(["gigo", "str", "a.gigo.go", "--log-level", "loud"]).unwrap_err();
        assert!(err.to_string().contains("invalid log level `loud`"), "{err}");
    }

    #[test]
    fn test_only_gen_mutates() {
        assert!(Command::Gen.mutates());
        assert!(!Command::Str.mutates());
        assert!(!Command::Dump.mutates());
    }

    #[test]
    fn test_files_are_required() {
        assert!(Args::try_parse_from(["gigo", "str"]).is_err());
        assert!(Args::try_parse_from(["gigo", "nope", "a.gigo.go"]).is_err());
    }
}
