// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Assembler pass engine.
//!
//! The engine walks the parsed lines once. A symbol used before its label
//! is seen is queued against the record that uses it, and the record is
//! patched in place when the label gets bound. Records are kept in an arena
//! (`Vec<Record>`) and the queue stores indices into it.
//!
//! [`PassEngine`] runs the sweep one line per [`PassEngine::step`];
//! [`run_pass`] drives the same engine to completion in one call.

pub mod error;
pub mod listing;
pub mod record;


use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use log::{debug, info, trace};

use crate::core::objfile::format_records;
use crate::core::operand::{is_single_string, matches_shape, Operand, OperandKind};
use crate::core::optable::{OpEntry, OpTable, INSTRUCTION_SIZES, MAX_OPCODE};
use crate::core::parser::{parse_source, ParseError, SourceLine};
use crate::core::symbol_table::{
    SectionTable, Symbol, SymbolKind, SymbolTable, SymbolTableResult,
};

use error::{AsmError, Diagnostic, PassCounts};
use record::Record;

/// Highest address of the 24-bit address space.
pub const MAX_ADDRESS: i64 = 0xFF_FFFF;
const MAX_BYTE: i64 = 0xFF;

pub fn in_address_range(address: i64) -> bool {
    (0..=MAX_ADDRESS).contains(&address)
}

/// Addressing modes a program may be limited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AddressingRestriction {
    #[default]
    #[value(name = "any")]
    Unrestricted,
    #[value(name = "no-relative")]
    ForbidRelative,
    #[value(name = "no-direct")]
    ForbidDirect,
}

impl AddressingRestriction {
    pub fn allows(self, mode: AddressingMode) -> bool {
        !matches!(
            (self, mode),
            (Self::ForbidRelative, AddressingMode::Relative)
                | (Self::ForbidDirect, AddressingMode::Direct)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerConfig {
    pub addressing: AddressingRestriction,
}

/// Addressing mode, stored in the low two bits of the opcode byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Immediate = 0,
    Direct = 1,
    Relative = 2,
}

impl AddressingMode {
    pub fn of(operands: &[Operand]) -> Self {
        if operands
            .iter()
            .any(|op| matches!(op, Operand::RelativeIdentifier(_)))
        {
            AddressingMode::Relative
        } else if operands
            .iter()
            .any(|op| matches!(op, Operand::Identifier(_)))
        {
            AddressingMode::Direct
        } else {
            AddressingMode::Immediate
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AddressingMode::Immediate => "immediate",
            AddressingMode::Direct => "direct",
            AddressingMode::Relative => "relative",
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum DataUnit {
    Word,
    Byte,
}

impl DataUnit {
    fn bytes(self) -> i64 {
        match self {
            DataUnit::Word => 3,
            DataUnit::Byte => 1,
        }
    }

    fn max(self) -> i64 {
        match self {
            DataUnit::Word => MAX_ADDRESS,
            DataUnit::Byte => MAX_BYTE,
        }
    }

    fn digits(self) -> usize {
        match self {
            DataUnit::Word => 6,
            DataUnit::Byte => 2,
        }
    }

    fn define_directive(self) -> &'static str {
        match self {
            DataUnit::Word => "WORD",
            DataUnit::Byte => "BYTE",
        }
    }

    fn reserve_directive(self) -> &'static str {
        match self {
            DataUnit::Word => "RESW",
            DataUnit::Byte => "RESB",
        }
    }
}

/// The control section currently receiving code.
#[derive(Debug, Clone)]
struct OpenSection {
    name: String,
    start: i64,
    /// Index of the section's `H` record.
    header: usize,
    /// Every location counter value reached; valid entry points.
    addresses: Vec<i64>,
    /// Direct references waiting for their `M` records.
    modifications: Vec<(i64, String)>,
    /// Symbol name to the records that still use it symbolically.
    pending: HashMap<String, Vec<usize>>,
}

/// State owned by one pass.
#[derive(Debug, Clone, Default)]
struct PassContext {
    location_counter: i64,
    section: Option<OpenSection>,
    symbols: SymbolTable,
    records: Vec<Record>,
    diagnostics: Vec<Diagnostic>,
    start_seen: bool,
    end_seen: bool,
    line: Option<u32>,
}

impl PassContext {
    fn report(&mut self, error: AsmError) {
        let diag = Diagnostic::new(self.line, error);
        let diag = match &self.section {
            Some(section) => diag.with_location(&section.name, self.location_counter),
            None => diag,
        };
        self.diagnostics.push(diag);
    }

    fn current_table_mut(&mut self) -> Option<&mut SectionTable> {
        let name = &self.section.as_ref()?.name;
        self.symbols.section_mut(name)
    }

    fn queue(&mut self, name: &str, index: usize) {
        if let Some(section) = self.section.as_mut() {
            let positions = section.pending.entry(name.to_string()).or_default();
            if !positions.contains(&index) {
                positions.push(index);
            }
        }
    }

    fn advance(&mut self, length: i64, context: &'static str) {
        self.location_counter = self.location_counter.saturating_add(length);
        if let Some(section) = self.section.as_mut() {
            section.addresses.push(self.location_counter);
        }
        if !in_address_range(self.location_counter) {
            self.report(AsmError::AddressOutOfRange {
                address: self.location_counter,
                context,
            });
        }
    }

    fn process_line(&mut self, source: &SourceLine, optab: &OpTable, config: &AssemblerConfig) {
        self.line = Some(source.line);
        let parsed = &source.parsed;
        let mnemonic = parsed.mnemonic();
        let operands = parsed.operands();
        let label = parsed.label.as_deref();
        debug!(
            "line {}: {:06X} {}",
            source.line, self.location_counter, parsed
        );

        match mnemonic {
            "START" => return self.start(label, operands),
            "CSECT" if self.section.is_some() => return self.csect(label),
            _ if self.section.is_none() => {
                self.report(AsmError::MissingStart);
                if mnemonic == "END" {
                    self.end_seen = true;
                }
                return;
            }
            "EXTDEF" if label.is_some() => return self.report(AsmError::LabelNotAllowed("EXTDEF")),
            "EXTREF" if label.is_some() => return self.report(AsmError::LabelNotAllowed("EXTREF")),
            _ => {}
        }

        if let Some(label) = label {
            self.bind_label(label);
        }

        match mnemonic {
            "END" => self.end(operands),
            "WORD" => self.define_data(DataUnit::Word, operands),
            "BYTE" => self.define_data(DataUnit::Byte, operands),
            "RESW" => self.reserve(DataUnit::Word, operands),
            "RESB" => self.reserve(DataUnit::Byte, operands),
            "EXTDEF" => self.extdef(operands),
            "EXTREF" => self.extref(operands),
            _ => match optab.get(mnemonic) {
                Some(entry) => self.instruction(mnemonic, entry, operands, config),
                None => self.report(AsmError::UnknownMnemonic(mnemonic.to_string())),
            },
        }
    }

    fn start(&mut self, label: Option<&str>, operands: &[Operand]) {
        if self.start_seen {
            return self.report(AsmError::DuplicateStart);
        }
        self.start_seen = true;

        let start = match operands {
            [] => 0,
            [Operand::Number(value)] => *value,
            _ => {
                self.report(AsmError::InvalidStartOperand);
                0
            }
        };
        if start != 0 {
            self.report(AsmError::NonZeroStart(start));
        }
        let name = match label {
            Some(name) => name,
            None => {
                self.report(AsmError::MissingSectionName("START"));
                ""
            }
        };
        self.open_section(name, start);
    }

    fn csect(&mut self, label: Option<&str>) {
        let Some(name) = label else {
            return self.report(AsmError::MissingSectionName("CSECT"));
        };
        self.close_section();
        self.open_section(name, 0);
    }

    fn open_section(&mut self, name: &str, start: i64) {
        if self.symbols.open_section(name) == SymbolTableResult::Duplicate {
            self.report(AsmError::DuplicateSection(name.to_string()));
            if let Some(table) = self.symbols.section_mut(name) {
                *table = SectionTable::new();
            }
        }
        self.location_counter = start;
        let header = self.records.len();
        self.records.push(Record::Header {
            name: name.to_string(),
            start,
            size: None,
        });
        self.section = Some(OpenSection {
            name: name.to_string(),
            start,
            header,
            addresses: vec![start],
            modifications: Vec::new(),
            pending: HashMap::new(),
        });
    }

    /// Freeze the open section: set its size, flush `M` records and report
    /// names that never received an address.
    fn close_section(&mut self) {
        let Some(section) = self.section.take() else {
            return;
        };
        let size = self.location_counter - section.start;
        if let Some(Record::Header { size: slot, .. }) = self.records.get_mut(section.header) {
            *slot = Some(size);
        }

        let table = self.symbols.section(&section.name);
        for (address, name) in &section.modifications {
            let external = table
                .and_then(|table| table.get(name))
                .filter(|symbol| symbol.kind == SymbolKind::ExternalRefer)
                .map(|_| name.clone());
            self.records.push(Record::Modification {
                address: *address,
                external,
            });
        }

        let mut errors = Vec::new();
        for (name, symbol) in table.into_iter().flat_map(|table| table.iter()) {
            if symbol.is_bound() {
                continue;
            }
            match symbol.kind {
                SymbolKind::ExternalDefine => errors.push(AsmError::UndefinedExternal(name.to_string())),
                SymbolKind::None => errors.push(AsmError::UnresolvedReference(name.to_string())),
                SymbolKind::ExternalRefer => {}
            }
        }
        for error in errors {
            self.diagnostics.push(
                Diagnostic::new(self.line, error).with_location(&section.name, self.location_counter),
            );
        }
        info!("section {} closed, size {:X}", section.name, size);
    }

    fn bind_label(&mut self, label: &str) {
        let address = self.location_counter;
        let bound = match self.current_table_mut() {
            Some(table) => match table.get(label) {
                Some(symbol) if symbol.kind == SymbolKind::ExternalRefer => {
                    Err(AsmError::LabelIsExternal(label.to_string()))
                }
                _ => match table.bind(label, address) {
                    SymbolTableResult::Ok => Ok(()),
                    SymbolTableResult::Duplicate => {
                        Err(AsmError::DuplicateLabel(label.to_string()))
                    }
                },
            },
            None => return,
        };
        match bound {
            Ok(()) => self.resolve_pending(label),
            Err(error) => self.report(error),
        }
    }

    /// Patch every record queued against `name`, now that it has an address.
    fn resolve_pending(&mut self, name: &str) {
        let Some(section) = self.section.as_mut() else {
            return;
        };
        let Some(positions) = section.pending.remove(name) else {
            return;
        };
        let Some(table) = self.symbols.section(&section.name) else {
            return;
        };

        let mut errors = Vec::new();
        for index in positions {
            trace!("patching '{name}' in record {index}");
            match self.records.get_mut(index) {
                Some(Record::Text {
                    address,
                    size,
                    operands,
                    ..
                }) => {
                    let end = *address + i64::from(*size);
                    for operand in operands.iter_mut() {
                        if operand.symbol() != Some(name) {
                            continue;
                        }
                        match operand.resolve_value(table, end) {
                            Ok(value) => *operand = Operand::Number(value),
                            Err(err) => errors.push(AsmError::from(err)),
                        }
                    }
                }
                Some(Record::Define { address, .. }) => {
                    *address = table.get(name).and_then(|symbol| symbol.address);
                }
                _ => {}
            }
        }
        for error in errors {
            self.report(error);
        }
    }

    fn end(&mut self, operands: &[Operand]) {
        let Some(start) = self.section.as_ref().map(|section| section.start) else {
            return;
        };
        let entry = match operands {
            [] => start,
            [Operand::Number(value)] => *value,
            _ => {
                self.report(AsmError::InvalidEndOperand);
                start
            }
        };
        let reachable = self
            .section
            .as_ref()
            .is_some_and(|section| section.addresses.contains(&entry));
        if !reachable {
            self.report(AsmError::InvalidEntryPoint(entry));
        }
        self.close_section();
        self.records.push(Record::End { entry });
        self.end_seen = true;
    }

    fn define_data(&mut self, unit: DataUnit, operands: &[Operand]) {
        let directive = unit.define_directive();
        let [operand] = operands else {
            return self.report(AsmError::InvalidDirectiveOperand(directive));
        };
        let digits = unit.digits();
        let payload = match operand {
            Operand::Number(value) => {
                if !(0..=unit.max()).contains(value) {
                    self.report(AsmError::ValueOutOfRange {
                        directive,
                        value: *value,
                        max: unit.max(),
                    });
                }
                format!("{:0digits$X}", value & unit.max())
            }
            Operand::CString(text) => text.bytes().map(|b| format!("{b:0digits$X}")).collect(),
            Operand::XString(hex) => {
                let pad = (digits - hex.len() % digits) % digits;
                format!("{}{}", "0".repeat(pad), hex.to_ascii_uppercase())
            }
            _ => return self.report(AsmError::InvalidDirectiveOperand(directive)),
        };

        let length = operand.size() as i64 * unit.bytes();
        self.records.push(Record::TextBinary {
            address: self.location_counter,
            length,
            payload,
        });
        self.advance(length, directive);
    }

    fn reserve(&mut self, unit: DataUnit, operands: &[Operand]) {
        let directive = unit.reserve_directive();
        match operands {
            [Operand::Number(count)] if *count >= 0 => {
                let length = count.saturating_mul(unit.bytes());
                self.records.push(Record::TextBinary {
                    address: self.location_counter,
                    length,
                    payload: String::new(),
                });
                self.advance(length, directive);
            }
            [Operand::Number(_)] => self.report(AsmError::NegativeReservation(directive)),
            _ => self.report(AsmError::InvalidDirectiveOperand(directive)),
        }
    }

    fn extdef(&mut self, operands: &[Operand]) {
        let Some(names) = identifier_list(operands) else {
            return self.report(AsmError::InvalidExternalList("EXTDEF"));
        };
        for name in names {
            let declared = match self.current_table_mut() {
                Some(table) => match table.get_mut(name) {
                    Some(symbol) if symbol.kind != SymbolKind::None => {
                        Err(AsmError::ExternalRedefinition(name.to_string()))
                    }
                    Some(symbol) => {
                        symbol.kind = SymbolKind::ExternalDefine;
                        Ok(symbol.address)
                    }
                    None => {
                        table.insert(name, Symbol::external_define());
                        Ok(None)
                    }
                },
                None => return,
            };
            match declared {
                Ok(address) => {
                    let index = self.records.len();
                    self.records.push(Record::Define {
                        name: name.to_string(),
                        address,
                    });
                    if address.is_none() {
                        self.queue(name, index);
                    }
                }
                Err(error) => self.report(error),
            }
        }
    }

    fn extref(&mut self, operands: &[Operand]) {
        let Some(names) = identifier_list(operands) else {
            return self.report(AsmError::InvalidExternalList("EXTREF"));
        };
        for name in names {
            let added = match self.current_table_mut() {
                Some(table) if table.contains(name) => false,
                Some(table) => {
                    table.insert(name, Symbol::external_refer());
                    true
                }
                None => return,
            };
            if added {
                self.records.push(Record::Refer {
                    name: name.to_string(),
                });
            } else {
                self.report(AsmError::ExternalRedefinition(name.to_string()));
            }
        }
    }

    fn instruction(
        &mut self,
        mnemonic: &str,
        entry: OpEntry,
        operands: &[Operand],
        config: &AssemblerConfig,
    ) {
        let size = entry.size();
        debug_assert!(entry.opcode() <= MAX_OPCODE && INSTRUCTION_SIZES.contains(&size));

        if let Err(error) = check_format(mnemonic, size, operands) {
            self.report(error);
        }
        let mode = AddressingMode::of(operands);
        if !config.addressing.allows(mode) {
            self.report(AsmError::AddressingForbidden(mode));
        }

        let address = self.location_counter;
        let end = address + i64::from(size);
        let index = self.records.len();
        let mut resolved = operands.to_vec();
        let mut errors = Vec::new();
        let mut queued = Vec::new();
        if let Some(table) = self.current_table_mut() {
            for operand in resolved.iter_mut() {
                let Some(name) = operand.symbol().map(str::to_string) else {
                    continue;
                };
                match table.get(&name) {
                    Some(symbol) if symbol.is_bound() || symbol.kind == SymbolKind::ExternalRefer => {
                        match operand.resolve_value(table, end) {
                            Ok(value) => *operand = Operand::Number(value),
                            Err(err) => errors.push(AsmError::from(err)),
                        }
                    }
                    Some(_) => queued.push(name),
                    None => {
                        table.insert(&name, Symbol::pending());
                        queued.push(name);
                    }
                }
            }
        }
        for error in errors {
            self.report(error);
        }
        for name in &queued {
            self.queue(name, index);
        }
        if mode == AddressingMode::Direct {
            if let Some(section) = self.section.as_mut() {
                for operand in operands {
                    if let Operand::Identifier(name) = operand {
                        section.modifications.push((address, name.clone()));
                    }
                }
            }
        }

        self.records.push(Record::Text {
            address,
            size,
            opcode: (entry.opcode() << 2) | mode.code(),
            operands: resolved,
        });
        self.advance(i64::from(size), "instruction");
    }

    /// End-of-pass checks, run once after the last consumed line.
    fn finish(&mut self) {
        self.line = None;
        if !self.end_seen {
            self.close_section();
        }
        if !self.start_seen {
            self.report(AsmError::StartNotFound);
        }
        if !self.end_seen {
            self.report(AsmError::MissingEnd);
        }
        if !in_address_range(self.location_counter) {
            self.report(AsmError::AddressOutOfRange {
                address: self.location_counter,
                context: "final location counter",
            });
        }
        info!(
            "pass finished: {} records, {} diagnostics",
            self.records.len(),
            self.diagnostics.len()
        );
    }
}

/// Operand shapes accepted by each instruction size.
fn check_format(mnemonic: &str, size: u8, operands: &[Operand]) -> Result<(), AsmError> {
    let invalid = || AsmError::InvalidFormat {
        mnemonic: mnemonic.to_string(),
        size,
    };
    match (size, operands) {
        (1, []) => Ok(()),
        (2, [Operand::Number(value)]) => {
            if (0..=MAX_BYTE).contains(value) {
                Ok(())
            } else {
                Err(AsmError::ImmediateTooLarge(*value))
            }
        }
        (2, ops) if matches_shape(ops, &[OperandKind::Register, OperandKind::Register]) => Ok(()),
        (2, ops) if is_single_string(ops) => {
            if ops[0].size() <= 1 {
                Ok(())
            } else {
                Err(AsmError::StringTooLong(ops[0].to_string()))
            }
        }
        (3, [Operand::RelativeIdentifier(_)]) => Ok(()),
        (4, [Operand::Identifier(_)]) => Ok(()),
        (4, [Operand::Number(value)]) => check_operand_address(*value),
        (4, ops) if is_single_string(ops) => match ops[0].constant_value() {
            Some(Ok(value)) => check_operand_address(value),
            Some(Err(err)) => Err(err.into()),
            None => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

fn check_operand_address(value: i64) -> Result<(), AsmError> {
    if in_address_range(value) {
        Ok(())
    } else {
        Err(AsmError::AddressOutOfRange {
            address: value,
            context: "operand",
        })
    }
}

fn identifier_list(operands: &[Operand]) -> Option<Vec<&str>> {
    if operands.is_empty() {
        return None;
    }
    operands
        .iter()
        .map(|op| match op {
            Operand::Identifier(name) => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

/// Accumulated pass state after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSnapshot {
    pub records: Vec<Record>,
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
    /// Source line consumed by the step; `None` for the end-of-pass step.
    pub line: Option<u32>,
    pub location_counter: i64,
    first_new_record: usize,
    first_new_diagnostic: usize,
}

impl PassSnapshot {
    /// Records appended by the step that produced this snapshot.
    pub fn new_records(&self) -> &[Record] {
        self.records.get(self.first_new_record..).unwrap_or(&[])
    }

    /// Diagnostics raised by the step that produced this snapshot.
    pub fn new_diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics
            .get(self.first_new_diagnostic..)
            .unwrap_or(&[])
    }
}

/// Resumable pass over parsed source lines.
pub struct PassEngine<'a> {
    lines: &'a [SourceLine],
    optab: &'a OpTable,
    config: AssemblerConfig,
    next: usize,
    done: bool,
    context: PassContext,
}

impl<'a> PassEngine<'a> {
    pub fn new(lines: &'a [SourceLine], optab: &'a OpTable, config: AssemblerConfig) -> Self {
        Self {
            lines,
            optab,
            config,
            next: 0,
            done: false,
            context: PassContext::default(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Consume one line; once every line (or `END`) has been consumed, run
    /// the end-of-pass checks. Returns true when the pass is complete.
    fn advance(&mut self) -> bool {
        if self.done {
            return true;
        }
        match self.lines.get(self.next) {
            Some(line) if !self.context.end_seen => {
                self.context.process_line(line, self.optab, &self.config);
                self.next += 1;
            }
            _ => {
                self.context.finish();
                self.done = true;
            }
        }
        self.done
    }

    /// Advance by one line and return the accumulated state.
    pub fn step(&mut self) -> (PassSnapshot, bool) {
        let marks = self.marks();
        let done = self.advance();
        (self.snapshot_from(marks), done)
    }

    /// Current state without advancing.
    pub fn snapshot(&self) -> PassSnapshot {
        self.snapshot_from(self.marks())
    }

    /// Run the remaining steps and return the final state.
    pub fn finish(mut self) -> PassSnapshot {
        loop {
            let marks = self.marks();
            if self.advance() {
                return self.into_snapshot(marks);
            }
        }
    }

    fn marks(&self) -> (usize, usize) {
        (
            self.context.records.len(),
            self.context.diagnostics.len(),
        )
    }

    fn snapshot_from(&self, (records, diagnostics): (usize, usize)) -> PassSnapshot {
        PassSnapshot {
            records: self.context.records.clone(),
            symbols: self.context.symbols.clone(),
            diagnostics: self.context.diagnostics.clone(),
            line: self.context.line,
            location_counter: self.context.location_counter,
            first_new_record: records,
            first_new_diagnostic: diagnostics,
        }
    }

    fn into_snapshot(self, (records, diagnostics): (usize, usize)) -> PassSnapshot {
        PassSnapshot {
            records: self.context.records,
            symbols: self.context.symbols,
            diagnostics: self.context.diagnostics,
            line: self.context.line,
            location_counter: self.context.location_counter,
            first_new_record: records,
            first_new_diagnostic: diagnostics,
        }
    }
}

/// Run a whole pass in one call.
pub fn run_pass(lines: &[SourceLine], optab: &OpTable, config: AssemblerConfig) -> PassSnapshot {
    PassEngine::new(lines, optab, config).finish()
}

/// Result of assembling a source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub diagnostics: Vec<Diagnostic>,
    pub records: Vec<Record>,
    pub symbols: SymbolTable,
    /// Object-record lines, present only when there are no diagnostics.
    pub object: Option<Vec<String>>,
    pub counts: PassCounts,
}

impl Assembly {
    /// Combine parse errors with the final state of a pass.
    pub fn from_pass(line_count: usize, parse_errors: Vec<ParseError>, pass: PassSnapshot) -> Self {
        let mut diagnostics: Vec<Diagnostic> =
            parse_errors.into_iter().map(Diagnostic::from).collect();
        diagnostics.extend(pass.diagnostics);

        let object = diagnostics.is_empty().then(|| {
            debug_assert!(pass.records.iter().all(Record::is_resolved));
            format_records(&pass.records)
        });
        let counts = PassCounts {
            lines: u32::try_from(line_count).unwrap_or(u32::MAX),
            records: u32::try_from(pass.records.len()).unwrap_or(u32::MAX),
            errors: u32::try_from(diagnostics.len()).unwrap_or(u32::MAX),
        };
        Self {
            diagnostics,
            records: pass.records,
            symbols: pass.symbols,
            object,
            counts,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.object.is_some()
    }
}

/// Parse, run a pass, and format the object records.
pub fn assemble(source: &str, optab: &OpTable, config: AssemblerConfig) -> Assembly {
    let (lines, parse_errors) = parse_source(source);
    let pass = run_pass(&lines, optab, config);
    Assembly::from_pass(source.lines().count(), parse_errors, pass)
}
