// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types, diagnostics, and reporting for the assembler.

use std::fmt;

use thiserror::Error;

use crate::core::operand::ResolveError;
use crate::core::optable::OpTableError;
use crate::core::parser::ParseError;
use crate::core::parser_reporter::{format_parse_error, highlight_line};

use super::AddressingMode;

/// Categories of assembler errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmErrorKind {
    Syntax,
    Directive,
    Instruction,
    Symbol,
    Section,
    Address,
    OpTable,
}

/// Everything the assembler can report about a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AsmError {
    #[error("'{}' - {}", .0.text.trim(), .0.kind)]
    Syntax(ParseError),
    #[error("operation table {0}")]
    OpTable(#[from] OpTableError),

    #[error("program must begin with START")]
    MissingStart,
    #[error("START directive is missing")]
    StartNotFound,
    #[error("duplicate START directive")]
    DuplicateStart,
    #[error("START expects no operand or the load address 0")]
    InvalidStartOperand,
    #[error("non-zero load address {0:#X} in a relocatable program")]
    NonZeroStart(i64),
    #[error("{0} requires a label naming the section")]
    MissingSectionName(&'static str),
    #[error("END directive is missing")]
    MissingEnd,
    #[error("END expects no operand or a numeric entry point")]
    InvalidEndOperand,
    #[error("entry point {0:06X} is not an address of the current section")]
    InvalidEntryPoint(i64),
    #[error("invalid operand for {0}")]
    InvalidDirectiveOperand(&'static str),
    #[error("{directive} value {value} outside 0..={max:#X}")]
    ValueOutOfRange {
        directive: &'static str,
        value: i64,
        max: i64,
    },
    #[error("negative count in {0}")]
    NegativeReservation(&'static str),
    #[error("{0} does not accept a label")]
    LabelNotAllowed(&'static str),
    #[error("{0} expects a list of names")]
    InvalidExternalList(&'static str),

    #[error("unknown mnemonic '{0}'")]
    UnknownMnemonic(String),
    #[error("invalid operand format for {mnemonic} ({size}-byte instruction)")]
    InvalidFormat { mnemonic: String, size: u8 },
    #[error("immediate value {0} does not fit in one byte")]
    ImmediateTooLarge(i64),
    #[error("string {0} does not fit in one byte")]
    StringTooLong(String),
    #[error("{0} addressing is not allowed")]
    AddressingForbidden(AddressingMode),

    #[error("duplicate label '{0}'")]
    DuplicateLabel(String),
    #[error("label '{0}' is declared EXTREF")]
    LabelIsExternal(String),
    #[error("'{0}' is already declared")]
    ExternalRedefinition(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("EXTDEF name '{0}' never receives an address")]
    UndefinedExternal(String),
    #[error("reference to undefined name '{0}'")]
    UnresolvedReference(String),

    #[error("duplicate section name '{0}'")]
    DuplicateSection(String),

    #[error("address {} outside 000000-FFFFFF ({context})", signed_hex(.address))]
    AddressOutOfRange { address: i64, context: &'static str },
}

/// Hex with an explicit sign for negative values.
fn signed_hex(value: &i64) -> String {
    if *value < 0 {
        format!("-{:#X}", value.unsigned_abs())
    } else {
        format!("{value:#X}")
    }
}

impl AsmError {
    pub fn kind(&self) -> AsmErrorKind {
        match self {
            AsmError::Syntax(_) => AsmErrorKind::Syntax,
            AsmError::OpTable(_) => AsmErrorKind::OpTable,
            AsmError::MissingStart
            | AsmError::StartNotFound
            | AsmError::DuplicateStart
            | AsmError::InvalidStartOperand
            | AsmError::NonZeroStart(_)
            | AsmError::MissingEnd
            | AsmError::InvalidEndOperand
            | AsmError::InvalidEntryPoint(_)
            | AsmError::InvalidDirectiveOperand(_)
            | AsmError::ValueOutOfRange { .. }
            | AsmError::NegativeReservation(_)
            | AsmError::LabelNotAllowed(_)
            | AsmError::InvalidExternalList(_) => AsmErrorKind::Directive,
            AsmError::UnknownMnemonic(_)
            | AsmError::InvalidFormat { .. }
            | AsmError::ImmediateTooLarge(_)
            | AsmError::StringTooLong(_)
            | AsmError::AddressingForbidden(_) => AsmErrorKind::Instruction,
            AsmError::DuplicateLabel(_)
            | AsmError::LabelIsExternal(_)
            | AsmError::ExternalRedefinition(_)
            | AsmError::Resolve(_)
            | AsmError::UndefinedExternal(_)
            | AsmError::UnresolvedReference(_) => AsmErrorKind::Symbol,
            AsmError::MissingSectionName(_) | AsmError::DuplicateSection(_) => {
                AsmErrorKind::Section
            }
            AsmError::AddressOutOfRange { .. } => AsmErrorKind::Address,
        }
    }
}

/// A diagnostic with the line, section and location counter it was raised at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub(crate) line: Option<u32>,
    pub(crate) section: Option<String>,
    pub(crate) address: Option<i64>,
    pub(crate) error: AsmError,
}

impl Diagnostic {
    pub fn new(line: Option<u32>, error: AsmError) -> Self {
        Self {
            line,
            section: None,
            address: None,
            error,
        }
    }

    pub fn with_location(mut self, section: &str, address: i64) -> Self {
        self.section = Some(section.to_string());
        self.address = Some(address);
        self
    }

    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn address(&self) -> Option<i64> {
        self.address
    }

    pub fn error(&self) -> &AsmError {
        &self.error
    }

    fn message(&self) -> String {
        match self.address {
            Some(addr) => format!(
                "[{}:{:06X}] {}",
                self.section.as_deref().unwrap_or(""),
                addr,
                self.error
            ),
            None => self.error.to_string(),
        }
    }

    pub fn format(&self) -> String {
        match self.line {
            Some(line) => format!("{line}: ERROR - {}", self.message()),
            None => format!("ERROR - {}", self.message()),
        }
    }

    pub fn format_with_context(&self, lines: Option<&[String]>, use_color: bool) -> String {
        if let AsmError::Syntax(parse_error) = &self.error {
            return format_parse_error(parse_error, use_color);
        }
        let Some(line_num) = self.line else {
            return format!("ERROR: {}", self.message());
        };

        let mut out = format!("{line_num}: ERROR\n");
        for line in build_context_lines(line_num, lines, use_color) {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str(&format!("ERROR: {}", self.message()));
        out
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        Diagnostic::new(Some(err.span.line), AsmError::Syntax(err))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Pass statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassCounts {
    pub lines: u32,
    pub records: u32,
    pub errors: u32,
}

/// Build context lines for error display.
pub fn build_context_lines(line_num: u32, lines: Option<&[String]>, use_color: bool) -> Vec<String> {
    let line_idx = line_num.saturating_sub(1) as usize;
    match lines.and_then(|lines| lines.get(line_idx)) {
        Some(line) => {
            let first = line.len() - line.trim_start().len() + 1;
            vec![format!(
                "{:>5} | {}",
                line_num,
                highlight_line(line, first, use_color)
            )]
        }
        None => vec![format!("{:>5} | <source unavailable>", line_num)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_format_includes_line_and_location() {
        let diag = Diagnostic::new(Some(12), AsmError::DuplicateLabel("LOOP".into()))
            .with_location("PROG", 0x1A);
        assert_eq!(diag.format(), "12: ERROR - [PROG:00001A] duplicate label 'LOOP'");
    }

    #[test]
    fn end_of_pass_diagnostic_has_no_line() {
        let diag = Diagnostic::new(None, AsmError::MissingEnd);
        assert_eq!(diag.format(), "ERROR - END directive is missing");
        assert_eq!(diag.error().kind(), AsmErrorKind::Directive);
    }

    #[test]
    fn context_shows_source_line() {
        let lines = vec!["FIRST START".to_string(), "  JMP NOWHERE".to_string()];
        let diag = Diagnostic::new(Some(2), AsmError::UnresolvedReference("NOWHERE".into()))
            .with_location("FIRST", 4);
        let text = diag.format_with_context(Some(&lines), false);
        let out: Vec<_> = text.lines().collect();
        assert_eq!(out[0], "2: ERROR");
        assert_eq!(out[1], "    2 |   JMP NOWHERE");
        assert_eq!(out[2], "ERROR: [FIRST:000004] reference to undefined name 'NOWHERE'");
    }

    #[test]
    fn negative_address_prints_signed() {
        let err = AsmError::AddressOutOfRange {
            address: -1,
            context: "operand",
        };
        assert_eq!(err.to_string(), "address -0x1 outside 000000-FFFFFF (operand)");
        let err = AsmError::AddressOutOfRange {
            address: 0x100_0000,
            context: "location counter",
        };
        assert_eq!(
            err.to_string(),
            "address 0x1000000 outside 000000-FFFFFF (location counter)"
        );
    }

    #[test]
    fn missing_context_is_marked() {
        assert_eq!(
            build_context_lines(9, None, false),
            vec!["    9 | <source unavailable>".to_string()]
        );
    }
}
