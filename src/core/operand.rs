// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Operand representation shared by the parser, the pass engine and the
//! object-record formatter.
//!
//! Every operand knows two things about itself: how many bytes it occupies
//! when used as a data constant ([`Operand::size`]) and how to turn itself
//! into a number given the symbols of the section it appears in
//! ([`Operand::resolve_value`]).

use std::fmt;

use thiserror::Error;

use crate::core::symbol_table::{SectionTable, SymbolKind};

/// Smallest signed displacement a relative operand can encode.
pub const MIN_DISPLACEMENT: i64 = -0x8000;
/// Largest signed displacement a relative operand can encode.
pub const MAX_DISPLACEMENT: i64 = 0x7FFF;

/// A single instruction or directive operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// Numeric literal: `12`, `-0x1F`, `0o17`, `0b101`.
    Number(i64),
    /// Register reference `R0`..`R15`.
    Register(u8),
    /// Direct reference to a symbol.
    Identifier(String),
    /// Relative reference to a symbol: `@name`.
    RelativeIdentifier(String),
    /// Character string `c'...'`; holds the raw bytes between the quotes.
    CString(String),
    /// Hex string `x'...'`; holds the hex digits as written.
    XString(String),
}

/// Variant tag of an [`Operand`], used for shape matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    Number,
    Register,
    Identifier,
    RelativeIdentifier,
    CString,
    XString,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown symbolic name '{0}'")]
    UnknownSymbol(String),
    #[error("symbolic name '{0}' has no address yet")]
    Unbound(String),
    #[error("external reference '{0}' cannot be used with relative addressing")]
    ExternalRelative(String),
    #[error("relative displacement {displacement} to '{name}' does not fit in 16 bits")]
    DisplacementOutOfRange { name: String, displacement: i64 },
    #[error("constant {0} is too large")]
    ValueTooLarge(String),
}

impl Operand {
    pub fn kind(&self) -> OperandKind {
        match self {
            Operand::Number(_) => OperandKind::Number,
            Operand::Register(_) => OperandKind::Register,
            Operand::Identifier(_) => OperandKind::Identifier,
            Operand::RelativeIdentifier(_) => OperandKind::RelativeIdentifier,
            Operand::CString(_) => OperandKind::CString,
            Operand::XString(_) => OperandKind::XString,
        }
    }

    /// Bytes occupied when the operand is used as a data constant.
    pub fn size(&self) -> usize {
        match self {
            Operand::Number(_) => 1,
            Operand::Register(_) => 0,
            Operand::Identifier(_) => 3,
            Operand::RelativeIdentifier(_) => 2,
            Operand::CString(text) => text.len(),
            Operand::XString(digits) => digits.len().div_ceil(2),
        }
    }

    /// Name of the referenced symbol for `Identifier` and `RelativeIdentifier`.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Operand::Identifier(name) | Operand::RelativeIdentifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Operand::CString(_) | Operand::XString(_))
    }

    /// Value of an operand that needs no symbol context.
    ///
    /// Returns `None` for symbolic operands.
    pub fn constant_value(&self) -> Option<Result<i64, ResolveError>> {
        match self {
            Operand::Number(value) => Some(Ok(*value)),
            Operand::Register(index) => Some(Ok(i64::from(*index & 0x0F))),
            Operand::CString(text) => Some(cstring_value(text)),
            Operand::XString(digits) if digits.is_empty() => Some(Ok(0)),
            Operand::XString(digits) => Some(
                i64::from_str_radix(digits, 16)
                    .map_err(|_| ResolveError::ValueTooLarge(format!("x'{digits}'"))),
            ),
            Operand::Identifier(_) | Operand::RelativeIdentifier(_) => None,
        }
    }

    /// Resolve the operand to a number in the context of `table`.
    ///
    /// `instr_end` is the address right after the instruction that owns the
    /// operand; relative displacements are measured from there and returned
    /// as a 16-bit two's-complement value. A direct reference to a known
    /// symbol without an address (an external reference) resolves to 0.
    pub fn resolve_value(&self, table: &SectionTable, instr_end: i64) -> Result<i64, ResolveError> {
        match self {
            Operand::Identifier(name) => {
                let symbol = table
                    .get(name)
                    .ok_or_else(|| ResolveError::UnknownSymbol(name.clone()))?;
                Ok(symbol.address.unwrap_or(0))
            }
            Operand::RelativeIdentifier(name) => {
                let symbol = table
                    .get(name)
                    .ok_or_else(|| ResolveError::UnknownSymbol(name.clone()))?;
                let target = match (symbol.address, symbol.kind) {
                    (Some(addr), _) => addr,
                    (None, SymbolKind::ExternalRefer) => {
                        return Err(ResolveError::ExternalRelative(name.clone()))
                    }
                    (None, _) => return Err(ResolveError::Unbound(name.clone())),
                };
                let displacement = target - instr_end;
                if !(MIN_DISPLACEMENT..=MAX_DISPLACEMENT).contains(&displacement) {
                    return Err(ResolveError::DisplacementOutOfRange {
                        name: name.clone(),
                        displacement,
                    });
                }
                Ok(displacement & 0xFFFF)
            }
            _ => self
                .constant_value()
                .unwrap_or_else(|| Err(ResolveError::Unbound(self.to_string()))),
        }
    }
}

/// Big-endian concatenation of the character codes.
fn cstring_value(text: &str) -> Result<i64, ResolveError> {
    text.bytes().try_fold(0i64, |acc, b| {
        acc.checked_mul(256)
            .and_then(|v| v.checked_add(i64::from(b)))
            .ok_or_else(|| ResolveError::ValueTooLarge(format!("c'{text}'")))
    })
}

/// Check that `operands` has exactly the variant sequence in `pattern`.
pub fn matches_shape(operands: &[Operand], pattern: &[OperandKind]) -> bool {
    operands.len() == pattern.len()
        && operands
            .iter()
            .zip(pattern)
            .all(|(op, kind)| op.kind() == *kind)
}

/// A single string operand of either flavour.
pub fn is_single_string(operands: &[Operand]) -> bool {
    matches!(operands, [op] if op.is_string())
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Number(value) => write!(f, "{value}"),
            Operand::Register(index) => write!(f, "R{index}"),
            Operand::Identifier(name) => write!(f, "{name}"),
            Operand::RelativeIdentifier(name) => write!(f, "@{name}"),
            Operand::CString(text) => write!(f, "c'{text}'"),
            Operand::XString(digits) => write!(f, "x'{digits}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::symbol_table::Symbol;

    fn table_with(name: &str, symbol: Symbol) -> SectionTable {
        let mut table = SectionTable::new();
        table.insert(name, symbol);
        table
    }

    #[test]
    fn sizes_follow_variant() {
        assert_eq!(Operand::Number(300).size(), 1);
        assert_eq!(Operand::Register(3).size(), 0);
        assert_eq!(Operand::Identifier("A".into()).size(), 3);
        assert_eq!(Operand::RelativeIdentifier("A".into()).size(), 2);
        assert_eq!(Operand::CString("EOF".into()).size(), 3);
        assert_eq!(Operand::XString("F1".into()).size(), 1);
        assert_eq!(Operand::XString("ABC".into()).size(), 2);
    }

    #[test]
    fn constant_values() {
        assert_eq!(Operand::CString("AB".into()).constant_value(), Some(Ok(0x4142)));
        assert_eq!(Operand::XString("0f1".into()).constant_value(), Some(Ok(0xF1)));
        assert_eq!(Operand::Register(15).constant_value(), Some(Ok(15)));
        assert_eq!(Operand::Identifier("X".into()).constant_value(), None);
    }

    #[test]
    fn long_cstring_overflows_cleanly() {
        let op = Operand::CString("ABCDEFGHIJ".into());
        assert!(matches!(
            op.constant_value(),
            Some(Err(ResolveError::ValueTooLarge(_)))
        ));
    }

    #[test]
    fn identifier_resolves_to_address_or_zero() {
        let table = table_with("HERE", Symbol::local(0x30));
        let op = Operand::Identifier("HERE".into());
        assert_eq!(op.resolve_value(&table, 0), Ok(0x30));

        let table = table_with("EXT", Symbol::external_refer());
        let op = Operand::Identifier("EXT".into());
        assert_eq!(op.resolve_value(&table, 0), Ok(0));

        let op = Operand::Identifier("MISSING".into());
        assert_eq!(
            op.resolve_value(&table, 0),
            Err(ResolveError::UnknownSymbol("MISSING".into()))
        );
    }

    #[test]
    fn relative_displacement_is_twos_complement() {
        let table = table_with("T", Symbol::local(0x10));
        let op = Operand::RelativeIdentifier("T".into());
        assert_eq!(op.resolve_value(&table, 3), Ok(0x000D));

        let table = table_with("T", Symbol::local(0));
        assert_eq!(op.resolve_value(&table, 3), Ok(0xFFFD));
    }

    #[test]
    fn relative_to_external_is_rejected() {
        let table = table_with("EXT", Symbol::external_refer());
        let op = Operand::RelativeIdentifier("EXT".into());
        assert_eq!(
            op.resolve_value(&table, 3),
            Err(ResolveError::ExternalRelative("EXT".into()))
        );
    }

    #[test]
    fn relative_displacement_range_is_checked() {
        let table = table_with("FAR", Symbol::local(0x9000));
        let op = Operand::RelativeIdentifier("FAR".into());
        assert!(matches!(
            op.resolve_value(&table, 3),
            Err(ResolveError::DisplacementOutOfRange { .. })
        ));
    }

    #[test]
    fn shape_matching() {
        let ops = vec![Operand::Register(1), Operand::Register(2)];
        assert!(matches_shape(&ops, &[OperandKind::Register, OperandKind::Register]));
        assert!(!matches_shape(&ops, &[OperandKind::Register]));
        assert!(matches_shape(&[], &[]));
        assert!(is_single_string(&[Operand::XString("AA".into())]));
        assert!(!is_single_string(&[Operand::Number(1)]));
    }
}
