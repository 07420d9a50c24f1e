// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use log::LevelFilter;

use crate::core::assembler::{AddressingRestriction, AssemblerConfig};

use super::CliError;

pub const VERSION: &str = "0.1";

const LONG_ABOUT: &str = "Two-pass assembler for a SIC/XE-style instruction set.

The operation table is a text file with one `MNEMONIC OPCODE SIZE` row per line.
Opcodes must fit in 6 bits and sizes must be 1, 2, 3 or 4 bytes.
Object records (H/T/M/D/R/E) are written to -o/--outfile, or to stdout when it is omitted.
Nothing is written when the program has errors; diagnostics go to stderr.
Use -T/--trace to print the state of the pass after every source line.";

#[derive(Parser, Debug)]
#[command(
    name = "sicforge",
    version = VERSION,
    about = "Two-pass assembler for a SIC/XE-style instruction set",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        short = 'i',
        long = "infile",
        value_name = "FILE",
        long_help = "Assembly source file."
    )]
    pub infile: PathBuf,
    #[arg(
        short = 't',
        long = "optab",
        value_name = "FILE",
        long_help = "Operation table: one `MNEMONIC OPCODE SIZE` row per line, `;` starts a comment."
    )]
    pub optab: PathBuf,
    #[arg(
        short = 'o',
        long = "outfile",
        value_name = "FILE",
        long_help = "Write object records to FILE instead of stdout."
    )]
    pub outfile: Option<PathBuf>,
    #[arg(
        short = 's',
        long = "symbols",
        action = ArgAction::SetTrue,
        long_help = "Print the symbol table of every control section after a successful run."
    )]
    pub symbols: bool,
    #[arg(
        short = 'T',
        long = "trace",
        action = ArgAction::SetTrue,
        long_help = "Run the pass one line at a time and print a trace listing of each step."
    )]
    pub trace: bool,
    #[arg(
        short = 'a',
        long = "addressing",
        value_name = "MODE",
        value_enum,
        default_value_t = AddressingRestriction::Unrestricted,
        long_help = "Restrict the addressing modes a program may use: any, no-relative or no-direct."
    )]
    pub addressing: AddressingRestriction,
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        long_help = "Raise log verbosity (repeatable). RUST_LOG overrides it."
    )]
    pub verbose: u8,
}

/// Settings derived from validated command-line arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliConfig {
    pub assembler: AssemblerConfig,
    pub log_level: LevelFilter,
}

pub fn validate_cli(cli: &Cli) -> Result<CliConfig, CliError> {
    if let Some(outfile) = cli.outfile.as_deref() {
        if same_path(outfile, &cli.infile) || same_path(outfile, &cli.optab) {
            return Err(CliError::OutputOverwritesInput(outfile.display().to_string()));
        }
    }
    Ok(CliConfig {
        assembler: AssemblerConfig {
            addressing: cli.addressing,
        },
        log_level: log_level(cli.verbose),
    })
}

pub fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn parses_addressing_mode() {
        let cli = parse(&["sicforge", "-i", "prog.asm", "-t", "ops.tab", "-a", "no-relative"]);
        assert_eq!(cli.addressing, AddressingRestriction::ForbidRelative);
        let config = validate_cli(&cli).unwrap();
        assert_eq!(
            config.assembler.addressing,
            AddressingRestriction::ForbidRelative
        );
        assert_eq!(config.log_level, LevelFilter::Warn);
    }

    #[test]
    fn defaults_and_flags() {
        let cli = parse(&["sicforge", "-i", "prog.asm", "-t", "ops.tab", "-s", "-T", "-vv"]);
        assert_eq!(cli.addressing, AddressingRestriction::Unrestricted);
        assert!(cli.symbols);
        assert!(cli.trace);
        assert_eq!(validate_cli(&cli).unwrap().log_level, LevelFilter::Trace);
    }

    #[test]
    fn optab_is_required() {
        assert!(Cli::try_parse_from(["sicforge", "-i", "prog.asm"]).is_err());
    }

    #[test]
    fn rejects_unknown_addressing_mode() {
        assert!(Cli::try_parse_from(["sicforge", "-i", "p.asm", "-t", "o.tab", "-a", "indexed"]).is_err());
    }

    #[test]
    fn output_must_not_overwrite_input() {
        let cli = parse(&["sicforge", "-i", "prog.asm", "-t", "ops.tab", "-o", "prog.asm"]);
        let err = validate_cli(&cli).unwrap_err();
        assert_eq!(err.to_string(), "output file prog.asm would overwrite an input file");
    }
}
