// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Line parser for assembly source.
//!
//! Each line is parsed on its own: an optional `label:`, a mnemonic, a
//! comma-separated operand list and an optional `;` comment. There is no
//! state carried from one line to the next.

use std::fmt;

use thiserror::Error;

use crate::core::operand::Operand;
use crate::core::text_utils::{is_ident_char, is_ident_start, is_quote, is_space, Cursor};

/// Highest register index accepted by the `R<n>` syntax.
pub const MAX_REGISTER: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: u32,
    pub col_start: usize,
    pub col_end: usize,
}

impl Span {
    fn new(line: u32, start: usize, end: usize) -> Self {
        Self {
            line,
            col_start: start + 1,
            col_end: end + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("expected a mnemonic")]
    ExpectedMnemonic,
    #[error("expected an operand")]
    ExpectedOperand,
    #[error("expected an identifier after '@'")]
    ExpectedIdentifier,
    #[error("invalid register '{0}': index must be between 0 and 15")]
    InvalidRegister(String),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("number '{0}' is too large")]
    NumberTooLarge(String),
    #[error("invalid hex string")]
    InvalidHexString,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unrecognized operand '{0}'")]
    UnrecognizedOperand(String),
    #[error("unexpected text '{0}'")]
    TrailingText(String),
}

/// A line that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {}: '{}' - {kind}", .span.line, .text.trim())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    /// Raw text of the offending line.
    pub text: String,
}

/// Mnemonic and its operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub mnemonic: String,
    pub operands: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub label: Option<String>,
    pub command: ParsedCommand,
}

impl ParsedLine {
    pub fn mnemonic(&self) -> &str {
        &self.command.mnemonic
    }

    pub fn operands(&self) -> &[Operand] {
        &self.command.operands
    }
}

impl fmt::Display for ParsedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mnemonic)?;
        for (ix, op) in self.operands.iter().enumerate() {
            let sep = if ix == 0 { " " } else { ", " };
            write!(f, "{sep}{op}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ParsedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{label}: ")?;
        }
        write!(f, "{}", self.command)
    }
}

/// A parsed line together with its 1-based source line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub line: u32,
    pub parsed: ParsedLine,
}

/// Parse a whole program. Lines that fail to parse are reported and skipped;
/// blank and comment-only lines produce nothing.
pub fn parse_source(source: &str) -> (Vec<SourceLine>, Vec<ParseError>) {
    let mut lines = Vec::new();
    let mut errors = Vec::new();
    for (ix, text) in source.split('\n').enumerate() {
        let line_num = ix as u32 + 1;
        match parse_line(text, line_num) {
            Ok(Some(parsed)) => lines.push(SourceLine {
                line: line_num,
                parsed,
            }),
            Ok(None) => {}
            Err(err) => errors.push(err),
        }
    }
    (lines, errors)
}

/// Parse one source line.
pub fn parse_line(text: &str, line_num: u32) -> Result<Option<ParsedLine>, ParseError> {
    LineParser {
        cur: Cursor::new(text),
        text,
        line_num,
    }
    .parse()
}

/// Parse a standalone numeric literal using the operand number grammar.
pub fn parse_number(text: &str) -> Option<i64> {
    let text = text.trim();
    let mut parser = LineParser {
        cur: Cursor::new(text),
        text,
        line_num: 0,
    };
    match parser.parse_number() {
        Ok(Operand::Number(value)) if parser.cur.at_end() => Some(value),
        _ => None,
    }
}

struct LineParser<'a> {
    cur: Cursor<'a>,
    text: &'a str,
    line_num: u32,
}

impl<'a> LineParser<'a> {
    fn parse(mut self) -> Result<Option<ParsedLine>, ParseError> {
        self.cur.skip_ws();
        if self.at_tail() {
            return Ok(None);
        }

        let label_start = self.cur.pos();
        let mut label = None;
        if let Some(ident) = self.cur.take_ident() {
            if self.cur.eat(b':') {
                label = Some(ident.to_string());
            } else {
                self.cur.set_pos(label_start);
            }
        }
        self.cur.skip_ws();

        let mnemonic_start = self.cur.pos();
        let mnemonic = self
            .cur
            .take_ident()
            .ok_or_else(|| self.error(ParseErrorKind::ExpectedMnemonic, mnemonic_start))?
            .to_string();
        if !self.at_tail() && !self.cur.peek().is_some_and(is_space) {
            let start = self.cur.pos();
            let junk = self.cur.take_while(|c| !is_space(c)).to_string();
            return Err(self.error(ParseErrorKind::TrailingText(junk), start));
        }
        self.cur.skip_ws();

        let mut operands = Vec::new();
        if !self.at_tail() {
            loop {
                let (operand, rest_consumed) = self.parse_operand()?;
                operands.push(operand);
                if rest_consumed {
                    break;
                }
                self.cur.skip_ws();
                if self.cur.eat(b',') {
                    self.cur.skip_ws();
                    continue;
                }
                break;
            }
        }

        self.cur.skip_ws();
        if !self.at_tail() {
            let start = self.cur.pos();
            let junk = self.cur.rest().trim_end().to_string();
            return Err(self.error(ParseErrorKind::TrailingText(junk), start));
        }

        Ok(Some(ParsedLine {
            label,
            command: ParsedCommand { mnemonic, operands },
        }))
    }

    /// End of line or start of a trailing comment.
    fn at_tail(&self) -> bool {
        matches!(self.cur.peek(), None | Some(b';'))
    }

    fn error(&self, kind: ParseErrorKind, start: usize) -> ParseError {
        ParseError {
            kind,
            span: Span::new(self.line_num, start, self.cur.pos().max(start)),
            text: self.text.to_string(),
        }
    }

    /// Parse one operand. The flag is set when the operand swallowed the
    /// rest of the line (character strings).
    fn parse_operand(&mut self) -> Result<(Operand, bool), ParseError> {
        let start = self.cur.pos();
        let first = match self.cur.peek() {
            Some(c) => c,
            None => return Err(self.error(ParseErrorKind::ExpectedOperand, start)),
        };
        let next = self.cur.peek_at(1);

        if matches!(first, b'R' | b'r') && next.is_some_and(|c| c.is_ascii_digit()) {
            if let Some(reg) = self.parse_register()? {
                return Ok((reg, false));
            }
        }
        if first == b'-' || first.is_ascii_digit() {
            return self.parse_number().map(|num| (num, false));
        }
        if matches!(first, b'x' | b'X') && next.is_some_and(is_quote) {
            return self.parse_xstring().map(|s| (s, false));
        }
        if matches!(first, b'c' | b'C') && next.is_some_and(is_quote) {
            return self.parse_cstring().map(|s| (s, true));
        }
        if first == b'@' {
            self.cur.next();
            return match self.cur.take_ident() {
                Some(name) => Ok((Operand::RelativeIdentifier(name.to_string()), false)),
                None => Err(self.error(ParseErrorKind::ExpectedIdentifier, start)),
            };
        }
        if is_ident_start(first) {
            if let Some(name) = self.cur.take_ident() {
                return Ok((Operand::Identifier(name.to_string()), false));
            }
        }
        if first == b';' {
            return Err(self.error(ParseErrorKind::ExpectedOperand, start));
        }
        let token = self
            .cur
            .take_while(|c| !is_space(c) && c != b',' && c != b';')
            .to_string();
        Err(self.error(ParseErrorKind::UnrecognizedOperand(token), start))
    }

    /// `R<digits>` not followed by identifier characters. Returns `None`
    /// (cursor restored) when the token is really an identifier like `R2D2`.
    fn parse_register(&mut self) -> Result<Option<Operand>, ParseError> {
        let start = self.cur.pos();
        self.cur.next();
        let digits = self.cur.take_while(|c| c.is_ascii_digit());
        if self.cur.peek().is_some_and(is_ident_char) {
            self.cur.set_pos(start);
            return Ok(None);
        }
        match digits.parse::<i64>() {
            Ok(index) if (0..=MAX_REGISTER).contains(&index) => {
                Ok(Some(Operand::Register(index as u8)))
            }
            _ => {
                let token = self.text[start..self.cur.pos()].to_string();
                Err(self.error(ParseErrorKind::InvalidRegister(token), start))
            }
        }
    }

    fn parse_number(&mut self) -> Result<Operand, ParseError> {
        let start = self.cur.pos();
        let negative = self.cur.eat(b'-');
        let radix = match (self.cur.peek(), self.cur.peek_at(1), self.cur.peek_at(2)) {
            (Some(b'0'), Some(b'x' | b'X'), Some(d)) if d.is_ascii_hexdigit() => 16,
            (Some(b'0'), Some(b'o' | b'O'), Some(d)) if (b'0'..=b'7').contains(&d) => 8,
            (Some(b'0'), Some(b'b' | b'B'), Some(d)) if d == b'0' || d == b'1' => 2,
            _ => 10,
        };
        if radix != 10 {
            self.cur.next();
            self.cur.next();
        }
        let digits = self.cur.take_while(|c| (c as char).is_digit(radix));
        if digits.is_empty() || self.cur.peek().is_some_and(is_ident_char) {
            self.cur.take_while(is_ident_char);
            let token = self.text[start..self.cur.pos()].to_string();
            return Err(self.error(ParseErrorKind::InvalidNumber(token), start));
        }
        let value = i64::from_str_radix(digits, radix).map_err(|_| {
            let token = self.text[start..self.cur.pos()].to_string();
            self.error(ParseErrorKind::NumberTooLarge(token), start)
        })?;
        Ok(Operand::Number(if negative { -value } else { value }))
    }

    fn parse_xstring(&mut self) -> Result<Operand, ParseError> {
        let start = self.cur.pos();
        self.cur.next();
        let quote = self.cur.next().unwrap_or(b'\'');
        let digits = self.cur.take_while(|c| c.is_ascii_hexdigit());
        if self.cur.eat(quote) && !digits.is_empty() {
            return Ok(Operand::XString(digits.to_string()));
        }
        let kind = if self.cur.at_end() {
            ParseErrorKind::UnterminatedString
        } else {
            ParseErrorKind::InvalidHexString
        };
        Err(self.error(kind, start))
    }

    /// Character strings run to the last quote on the line; a trailing
    /// `; comment` after that quote is allowed as long as the comment itself
    /// holds no quote or semicolon.
    fn parse_cstring(&mut self) -> Result<Operand, ParseError> {
        let start = self.cur.pos();
        self.cur.next();
        let quote = self.cur.next().unwrap_or(b'\'');
        let rest = self.cur.rest();
        match cstring_body(rest, quote) {
            Some(body) => {
                let body = body.to_string();
                self.cur.set_pos(self.text.len());
                Ok(Operand::CString(body))
            }
            None => {
                self.cur.set_pos(self.text.len());
                Err(self.error(ParseErrorKind::UnterminatedString, start))
            }
        }
    }
}

fn cstring_body(rest: &str, quote: u8) -> Option<&str> {
    let trimmed = rest.trim_end_matches([' ', '\t', '\r']);
    let bytes = trimmed.as_bytes();
    if bytes.last() == Some(&quote) {
        return Some(&trimmed[..trimmed.len() - 1]);
    }
    let semi = bytes.iter().rposition(|&b| b == quote || b == b';')?;
    if bytes[semi] != b';' {
        return None;
    }
    let head = trimmed[..semi].trim_end_matches([' ', '\t']);
    if head.as_bytes().last() == Some(&quote) {
        Some(&head[..head.len() - 1])
    } else {
        None
    }
}
