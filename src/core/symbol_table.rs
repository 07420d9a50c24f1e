// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Per-section symbol tables for labels and external names.

use std::fmt;
use std::io::{self, Write};

/// Linkage of a symbol within its section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SymbolKind {
    /// Plain label, or a name seen only as a forward reference so far.
    #[default]
    None,
    /// Exported with `EXTDEF`; must receive an address before the section closes.
    ExternalDefine,
    /// Imported with `EXTREF`; never has a local address.
    ExternalRefer,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SymbolKind::None => "",
            SymbolKind::ExternalDefine => "EXTDEF",
            SymbolKind::ExternalRefer => "EXTREF",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Symbol {
    pub address: Option<i64>,
    pub kind: SymbolKind,
}

impl Symbol {
    pub fn local(address: i64) -> Self {
        Self {
            address: Some(address),
            kind: SymbolKind::None,
        }
    }

    /// A name referenced before its definition.
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn external_define() -> Self {
        Self {
            address: None,
            kind: SymbolKind::ExternalDefine,
        }
    }

    pub fn external_refer() -> Self {
        Self {
            address: None,
            kind: SymbolKind::ExternalRefer,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.address.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SymbolTableResult {
    Ok,
    Duplicate,
}

/// Symbols of one control section, kept in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTable {
    entries: Vec<(String, Symbol)>,
}

impl SectionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace `name`.
    pub fn insert(&mut self, name: &str, symbol: Symbol) {
        match self.get_mut(name) {
            Some(existing) => *existing = symbol,
            None => self.entries.push((name.to_string(), symbol)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, symbol)| symbol)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.entries
            .iter_mut()
            .find(|(entry, _)| entry == name)
            .map(|(_, symbol)| symbol)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Bind `name` to `address`, keeping any linkage already declared for it.
    pub fn bind(&mut self, name: &str, address: i64) -> SymbolTableResult {
        match self.get_mut(name) {
            Some(symbol) if symbol.is_bound() => SymbolTableResult::Duplicate,
            Some(symbol) => {
                symbol.address = Some(address);
                SymbolTableResult::Ok
            }
            None => {
                self.entries.push((name.to_string(), Symbol::local(address)));
                SymbolTableResult::Ok
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.entries.iter().map(|(name, symbol)| (name.as_str(), symbol))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One row of the symbol table report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRow {
    pub name: String,
    pub address: Option<i64>,
    pub section: String,
    pub kind: SymbolKind,
}

impl SymbolRow {
    pub fn address_text(&self) -> String {
        match self.address {
            Some(addr) => format!("0x{addr:06x}"),
            None => "unresolved".to_string(),
        }
    }
}

/// All control sections of a program, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolTable {
    sections: Vec<(String, SectionTable)>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new control section with an empty table.
    pub fn open_section(&mut self, name: &str) -> SymbolTableResult {
        if self.has_section(name) {
            return SymbolTableResult::Duplicate;
        }
        self.sections.push((name.to_string(), SectionTable::new()));
        SymbolTableResult::Ok
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|(section, _)| section == name)
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionTable> {
        self.sections
            .iter()
            .find(|(section, _)| section == name)
            .map(|(_, table)| table)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut SectionTable> {
        self.sections
            .iter_mut()
            .find(|(section, _)| section == name)
            .map(|(_, table)| table)
    }

    #[must_use]
    pub fn lookup(&self, section: &str, name: &str) -> Option<&Symbol> {
        self.section(section).and_then(|table| table.get(name))
    }

    /// Report rows: sections in declaration order, each sorted by address
    /// with unresolved names first.
    #[must_use]
    pub fn rows(&self) -> Vec<SymbolRow> {
        let mut rows = Vec::new();
        for (section, table) in &self.sections {
            let mut entries: Vec<_> = table.iter().collect();
            entries.sort_by_key(|(_, symbol)| symbol.address.unwrap_or(-1));
            rows.extend(entries.into_iter().map(|(name, symbol)| SymbolRow {
                name: name.to_string(),
                address: symbol.address,
                section: section.clone(),
                kind: symbol.kind,
            }));
        }
        rows
    }

    pub fn dump<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "{:<16} {:<10} {:<16} TYPE", "NAME", "ADDRESS", "SECTION")?;
        for row in self.rows() {
            writeln!(
                out,
                "{:<16} {:<10} {:<16} {}",
                row.name,
                row.address_text(),
                row.section,
                row.kind
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Symbol, SymbolKind, SymbolTable, SymbolTableResult};

    #[test]
    fn bind_is_case_sensitive_and_rejects_duplicates() {
        let mut table = SymbolTable::new();
        assert_eq!(table.open_section("PROG"), SymbolTableResult::Ok);
        let section = table.section_mut("PROG").unwrap();
        assert_eq!(section.bind("Loop", 3), SymbolTableResult::Ok);
        assert_eq!(section.bind("LOOP", 6), SymbolTableResult::Ok);
        assert_eq!(section.bind("Loop", 9), SymbolTableResult::Duplicate);
        assert_eq!(table.lookup("PROG", "Loop").and_then(|s| s.address), Some(3));
        assert_eq!(table.lookup("PROG", "LOOP").and_then(|s| s.address), Some(6));
    }

    #[test]
    fn bind_keeps_external_define_kind() {
        let mut table = SymbolTable::new();
        let _ = table.open_section("A");
        let section = table.section_mut("A").unwrap();
        section.insert("OUT", Symbol::external_define());
        assert_eq!(section.bind("OUT", 0x12), SymbolTableResult::Ok);
        let symbol = section.get("OUT").unwrap();
        assert_eq!(symbol.kind, SymbolKind::ExternalDefine);
        assert_eq!(symbol.address, Some(0x12));
    }

    #[test]
    fn duplicate_sections_are_rejected() {
        let mut table = SymbolTable::new();
        assert_eq!(table.open_section("A"), SymbolTableResult::Ok);
        assert_eq!(table.open_section("A"), SymbolTableResult::Duplicate);
    }

    #[test]
    fn rows_sort_by_address_with_unresolved_first() {
        let mut table = SymbolTable::new();
        let _ = table.open_section("A");
        let section = table.section_mut("A").unwrap();
        section.insert("LATE", Symbol::local(9));
        section.insert("EXT", Symbol::external_refer());
        section.insert("EARLY", Symbol::local(0));
        let names: Vec<_> = table.rows().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["EXT", "EARLY", "LATE"]);
    }

    #[test]
    fn dump_renders_unresolved() {
        let mut table = SymbolTable::new();
        let _ = table.open_section("A");
        table
            .section_mut("A")
            .unwrap()
            .insert("EXT", Symbol::external_refer());
        let mut out = Vec::new();
        table.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("unresolved"));
        assert!(text.contains("EXTREF"));
    }
}
