// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Operation table: mnemonic to opcode and instruction size.
//!
//! A table can only be built through [`OpTable::new`] (or its text loader
//! [`OpTable::parse`]), which checks every row and reports all problems at
//! once. An [`OpEntry`] obtained from a table is therefore always in range.

use thiserror::Error;

use crate::core::parser::parse_number;
use crate::core::text_utils::{is_ident_char, is_ident_start};

/// Directive names reserved by the assembler.
pub const DIRECTIVES: &[&str] = &[
    "START", "END", "WORD", "BYTE", "RESW", "RESB", "CSECT", "EXTDEF", "EXTREF",
];

/// Register names an instruction mnemonic may not shadow.
pub const REGISTER_NAMES: &[&str] = &[
    "R1", "R2", "R3", "R4", "R5", "R6", "R7", "R8", "R9", "Ra", "Rb", "Rc", "Rd", "Re", "Rf",
];

/// Largest opcode that still fits in the byte once shifted past the
/// two addressing-mode bits.
pub const MAX_OPCODE: u8 = 0x3F;

/// Allowed instruction sizes in bytes.
pub const INSTRUCTION_SIZES: &[u8] = &[1, 2, 3, 4];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpTableError {
    #[error("row {row}: '{mnemonic}' is not a valid mnemonic")]
    InvalidMnemonic { row: usize, mnemonic: String },
    #[error("row {row}: duplicate mnemonic '{mnemonic}'")]
    DuplicateMnemonic { row: usize, mnemonic: String },
    #[error("row {row}: mnemonic '{mnemonic}' collides with a register name")]
    RegisterName { row: usize, mnemonic: String },
    #[error("row {row}: mnemonic '{mnemonic}' collides with a directive")]
    DirectiveName { row: usize, mnemonic: String },
    #[error("row {row}: opcode {opcode:#x} does not fit in 6 bits")]
    OpcodeTooLarge { row: usize, opcode: i64 },
    #[error("row {row}: duplicate opcode {opcode:#x}")]
    DuplicateOpcode { row: usize, opcode: i64 },
    #[error("row {row}: instruction size {size} must be 1, 2, 3 or 4 bytes")]
    InvalidSize { row: usize, size: i64 },
    #[error("row {row}: expected 'MNEMONIC OPCODE SIZE', found '{text}'")]
    MalformedRow { row: usize, text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpEntry {
    opcode: u8,
    size: u8,
}

impl OpEntry {
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn size(&self) -> u8 {
        self.size
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpTable {
    entries: Vec<(String, OpEntry)>,
}

impl OpTable {
    /// Build a table from `(mnemonic, opcode, size)` rows.
    pub fn new<S, I>(rows: I) -> Result<Self, Vec<OpTableError>>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, i64, i64)>,
    {
        let mut table = OpTable::default();
        let mut errors = Vec::new();
        let mut opcodes: Vec<i64> = Vec::new();

        for (ix, (mnemonic, opcode, size)) in rows.into_iter().enumerate() {
            let row = ix + 1;
            let mnemonic = mnemonic.into();
            let row_errors = errors.len();

            if !is_identifier(&mnemonic) {
                errors.push(OpTableError::InvalidMnemonic {
                    row,
                    mnemonic: mnemonic.clone(),
                });
            }
            if table.get(&mnemonic).is_some() {
                errors.push(OpTableError::DuplicateMnemonic {
                    row,
                    mnemonic: mnemonic.clone(),
                });
            }
            if REGISTER_NAMES.contains(&mnemonic.as_str()) {
                errors.push(OpTableError::RegisterName {
                    row,
                    mnemonic: mnemonic.clone(),
                });
            }
            if DIRECTIVES.contains(&mnemonic.as_str()) {
                errors.push(OpTableError::DirectiveName {
                    row,
                    mnemonic: mnemonic.clone(),
                });
            }
            if !(0..=i64::from(MAX_OPCODE)).contains(&opcode) {
                errors.push(OpTableError::OpcodeTooLarge { row, opcode });
            }
            if !INSTRUCTION_SIZES.iter().any(|s| i64::from(*s) == size) {
                errors.push(OpTableError::InvalidSize { row, size });
            }
            if opcodes.contains(&opcode) {
                errors.push(OpTableError::DuplicateOpcode { row, opcode });
            }
            opcodes.push(opcode);

            if errors.len() == row_errors {
                table.entries.push((
                    mnemonic,
                    OpEntry {
                        opcode: opcode as u8,
                        size: size as u8,
                    },
                ));
            }
        }

        if errors.is_empty() {
            Ok(table)
        } else {
            Err(errors)
        }
    }

    /// Load the text form: one `MNEMONIC OPCODE SIZE` row per line, with
    /// blank lines and `;` comments ignored.
    pub fn parse(text: &str) -> Result<Self, Vec<OpTableError>> {
        let mut rows = Vec::new();
        let mut errors = Vec::new();
        for (ix, line) in text.lines().enumerate() {
            let code = line.split(';').next().unwrap_or("");
            let fields: Vec<&str> = code.split_whitespace().collect();
            match fields.as_slice() {
                [] => {}
                [mnemonic, opcode, size] => match (parse_number(opcode), parse_number(size)) {
                    (Some(opcode), Some(size)) => rows.push((mnemonic.to_string(), opcode, size)),
                    _ => errors.push(OpTableError::MalformedRow {
                        row: ix + 1,
                        text: line.trim().to_string(),
                    }),
                },
                _ => errors.push(OpTableError::MalformedRow {
                    row: ix + 1,
                    text: line.trim().to_string(),
                }),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Self::new(rows)
    }

    #[must_use]
    pub fn get(&self, mnemonic: &str) -> Option<OpEntry> {
        self.entries
            .iter()
            .find(|(name, _)| name == mnemonic)
            .map(|(_, entry)| *entry)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, OpEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), *entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_identifier(text: &str) -> bool {
    let bytes = text.as_bytes();
    !bytes.is_empty() && is_ident_start(bytes[0]) && bytes[1..].iter().all(|&c| is_ident_char(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_valid_table() {
        let table = OpTable::new([("ADD", 1, 2), ("JMP", 2, 4), ("RET", 0x3F, 1)]).unwrap();
        assert_eq!(table.len(), 3);
        let jmp = table.get("JMP").unwrap();
        assert_eq!((jmp.opcode(), jmp.size()), (2, 4));
        assert!(table.get("jmp").is_none());
    }

    #[test]
    fn collects_every_violation() {
        let errors = OpTable::new([
            ("ADD", 1, 2),
            ("ADD", 2, 2),
            ("R1", 3, 1),
            ("WORD", 4, 1),
            ("BIG", 64, 1),
            ("DUP", 1, 3),
            ("ODD", 5, 5),
        ])
        .unwrap_err();
        assert_eq!(
            errors,
            vec![
                OpTableError::DuplicateMnemonic {
                    row: 2,
                    mnemonic: "ADD".into()
                },
                OpTableError::RegisterName {
                    row: 3,
                    mnemonic: "R1".into()
                },
                OpTableError::DirectiveName {
                    row: 4,
                    mnemonic: "WORD".into()
                },
                OpTableError::OpcodeTooLarge { row: 5, opcode: 64 },
                OpTableError::DuplicateOpcode { row: 6, opcode: 1 },
                OpTableError::InvalidSize { row: 7, size: 5 },
            ]
        );
    }

    #[test]
    fn parses_text_form() {
        let table = OpTable::parse("; name code size\nADD 0x01 2\n\nJMP 2 4 ; jump\n").unwrap();
        assert_eq!(table.get("ADD").map(|e| e.opcode()), Some(1));
        assert_eq!(table.get("JMP").map(|e| e.size()), Some(4));
    }

    #[test]
    fn malformed_text_rows_are_reported() {
        let errors = OpTable::parse("ADD 1\nJMP x 4").unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], OpTableError::MalformedRow { row: 1, .. }));
    }

    #[test]
    fn rejects_non_identifier_mnemonic() {
        let errors = OpTable::new([("1ADD", 1, 1)]).unwrap_err();
        assert!(matches!(errors[0], OpTableError::InvalidMnemonic { .. }));
    }
}
