// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Assembler core.
//!
//! # Components
//!
//! - [`text_utils`] - Text processing utilities (cursor, identifier predicates)
//! - [`operand`] - Operand variants with their size and value rules
//! - [`parser`] - Line parser for labels, mnemonics and operands
//! - [`parser_reporter`] - Parse errors rendered with source context
//! - [`optable`] - Validated mnemonic to opcode/size table
//! - [`symbol_table`] - Per-section symbol management
//! - [`assembler`] - Pass engine, diagnostics, records and trace listing
//! - [`objfile`] - Object-record text output

pub mod assembler;
pub mod objfile;
pub mod operand;
pub mod optable;
pub mod parser;
pub mod parser_reporter;
pub mod symbol_table;
pub mod text_utils;

// Re-exports for convenience
pub use assembler::{assemble, run_pass, AssemblerConfig, Assembly, PassEngine, PassSnapshot};
pub use objfile::format_records;
pub use operand::Operand;
pub use optable::OpTable;
pub use parser::{parse_source, ParseError};
pub use symbol_table::SymbolTable;
