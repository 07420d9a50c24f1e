// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line driver.
//!
//! Reads the operation table and the source file, runs the pass (stepped
//! when tracing) and writes the object records.

pub mod cli;


use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::Parser;
use env_logger::Env;
use log::info;
use thiserror::Error;

use crate::core::assembler::error::{AsmError, Diagnostic, PassCounts};
use crate::core::assembler::listing::ListingWriter;
use crate::core::assembler::{assemble, AssemblerConfig, Assembly, PassEngine};
use crate::core::objfile::ObjectWriter;
use crate::core::optable::OpTable;
use crate::core::parser::parse_source;

use cli::{validate_cli, Cli, CliConfig};

pub use cli::VERSION;

const STDOUT: &str = "<stdout>";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("cannot write {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error("output file {0} would overwrite an input file")]
    OutputOverwritesInput(String),
    #[error("operation table {0} is invalid")]
    OpTable(String),
    #[error("assembly failed with {0} error(s)")]
    Assembly(usize),
}

/// Report from a successful assembly run.
#[derive(Debug)]
pub struct AsmRunReport {
    counts: PassCounts,
}

impl AsmRunReport {
    pub fn counts(&self) -> PassCounts {
        self.counts
    }
}

/// Error from a failed assembly run.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct AsmRunError {
    #[source]
    error: CliError,
    diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
}

impl AsmRunError {
    pub fn new(error: CliError, diagnostics: Vec<Diagnostic>, source_lines: Vec<String>) -> Self {
        Self {
            error,
            diagnostics,
            source_lines,
        }
    }

    pub fn error(&self) -> &CliError {
        &self.error
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }
}

impl From<CliError> for AsmRunError {
    fn from(error: CliError) -> Self {
        AsmRunError::new(error, Vec::new(), Vec::new())
    }
}

/// Run the assembler with command-line arguments.
pub fn run() -> Result<AsmRunReport, AsmRunError> {
    let cli = Cli::parse();
    let config = validate_cli(&cli)?;
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(config.log_level.as_str()))
        .try_init();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with(&cli, &config, &mut out)
}

/// Run with already parsed arguments; listings and stdout output go to `out`.
pub fn run_with<W: Write>(
    cli: &Cli,
    config: &CliConfig,
    out: &mut W,
) -> Result<AsmRunReport, AsmRunError> {
    let optab = load_optab(&cli.optab)?;
    let source = read_file(&cli.infile)?;
    let source_lines: Vec<String> = source.lines().map(str::to_string).collect();

    let assembly = if cli.trace {
        trace_assembly(&source, &source_lines, &optab, config.assembler, out)?
    } else {
        assemble(&source, &optab, config.assembler)
    };

    if !assembly.is_ok() {
        return Err(AsmRunError::new(
            CliError::Assembly(assembly.diagnostics.len()),
            assembly.diagnostics,
            source_lines,
        ));
    }

    match cli.outfile.as_deref() {
        Some(path) => {
            let file = File::create(path).map_err(|source| write_error(path, source))?;
            ObjectWriter::new(BufWriter::new(file))
                .write_records(&assembly.records)
                .map_err(|source| write_error(path, source))?;
        }
        None => ObjectWriter::new(&mut *out)
            .write_records(&assembly.records)
            .map_err(stdout_error)?,
    }
    if cli.symbols {
        assembly.symbols.dump(&mut *out).map_err(stdout_error)?;
    }

    info!(
        "{}: {} lines, {} records",
        cli.infile.display(),
        assembly.counts.lines,
        assembly.counts.records
    );
    Ok(AsmRunReport {
        counts: assembly.counts,
    })
}

fn trace_assembly<W: Write>(
    source: &str,
    source_lines: &[String],
    optab: &OpTable,
    config: AssemblerConfig,
    out: &mut W,
) -> Result<Assembly, AsmRunError> {
    let (lines, parse_errors) = parse_source(source);
    let mut engine = PassEngine::new(&lines, optab, config);
    let mut listing = ListingWriter::new(&mut *out);
    listing
        .header(&format!("sicforge {VERSION} trace"))
        .map_err(stdout_error)?;

    let last = loop {
        let (snapshot, done) = engine.step();
        let text = snapshot
            .line
            .and_then(|line| source_lines.get(line.saturating_sub(1) as usize))
            .map(String::as_str);
        listing.write_step(&snapshot, text).map_err(stdout_error)?;
        if done {
            break snapshot;
        }
    };

    let assembly = Assembly::from_pass(source_lines.len(), parse_errors, last);
    listing
        .footer(&assembly.counts, &assembly.symbols)
        .map_err(stdout_error)?;
    Ok(assembly)
}

fn load_optab(path: &Path) -> Result<OpTable, AsmRunError> {
    let text = read_file(path)?;
    OpTable::parse(&text).map_err(|errors| {
        let diagnostics = errors
            .into_iter()
            .map(|err| Diagnostic::new(None, AsmError::OpTable(err)))
            .collect();
        AsmRunError::new(
            CliError::OpTable(path.display().to_string()),
            diagnostics,
            Vec::new(),
        )
    })
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn write_error(path: &Path, source: io::Error) -> CliError {
    CliError::Write {
        path: path.display().to_string(),
        source,
    }
}

fn stdout_error(source: io::Error) -> CliError {
    CliError::Write {
        path: STDOUT.to_string(),
        source,
    }
}
