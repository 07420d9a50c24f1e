// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Intermediate records produced by the pass engine.
//!
//! Records stay structured until the very end so that forward references
//! can be patched in place. [`crate::core::objfile`] renders them.

use crate::core::operand::Operand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Section header. `size` is filled in when the section closes.
    Header {
        name: String,
        start: i64,
        size: Option<i64>,
    },
    /// Machine instruction. Symbolic operands are replaced by numbers as
    /// their targets become known.
    Text {
        address: i64,
        size: u8,
        opcode: u8,
        operands: Vec<Operand>,
    },
    /// Data emitted by `WORD`/`BYTE`, or reserved space with an empty payload.
    TextBinary {
        address: i64,
        length: i64,
        payload: String,
    },
    /// Relocation for a direct reference; `external` names an `EXTREF` target.
    Modification {
        address: i64,
        external: Option<String>,
    },
    /// Exported name, with its address once the label is seen.
    Define { name: String, address: Option<i64> },
    /// Imported name.
    Refer { name: String },
    /// Program end with its entry point.
    End { entry: i64 },
}

impl Record {
    /// True once every value the record needs is known.
    pub fn is_resolved(&self) -> bool {
        match self {
            Record::Header { size, .. } => size.is_some(),
            Record::Text { operands, .. } => operands.iter().all(|op| op.symbol().is_none()),
            Record::Define { address, .. } => address.is_some(),
            _ => true,
        }
    }
}
