// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Trace listing for stepped passes.

use std::io::Write;

use crate::core::symbol_table::SymbolTable;

use super::error::PassCounts;
use super::PassSnapshot;

/// Writer for trace listing output.
pub struct ListingWriter<W: Write> {
    out: W,
}

impl<W: Write> ListingWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn header(&mut self, title: &str) -> std::io::Result<()> {
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "LINE  LC      SOURCE")?;
        writeln!(self.out, "----  ------  ------")?;
        Ok(())
    }

    /// One step: the consumed line followed by the records and diagnostics
    /// it produced.
    pub fn write_step(&mut self, snapshot: &PassSnapshot, source: Option<&str>) -> std::io::Result<()> {
        let line = snapshot
            .line
            .map(|line| line.to_string())
            .unwrap_or_else(|| "----".to_string());
        writeln!(
            self.out,
            "{:>4}  {:06X}  {}",
            line,
            snapshot.location_counter,
            source.unwrap_or("<end of pass>").trim_end()
        )?;
        for record in snapshot.new_records() {
            writeln!(self.out, "              > {record}")?;
        }
        for diag in snapshot.new_diagnostics() {
            writeln!(self.out, "              ! {}", diag.format())?;
        }
        Ok(())
    }

    pub fn footer(&mut self, counts: &PassCounts, symbols: &SymbolTable) -> std::io::Result<()> {
        writeln!(
            self.out,
            "\nLines: {}  Records: {}  Errors: {}",
            counts.lines, counts.records, counts.errors
        )?;
        writeln!(self.out, "\nSYMBOL TABLE\n")?;
        symbols.dump(&mut self.out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assembler::{AssemblerConfig, PassEngine};
    use crate::core::optable::OpTable;
    use crate::core::parser::parse_source;

    #[test]
    fn steps_list_records_and_diagnostics() {
        let source = "P: START\n FOO\n NOP\n END";
        let (lines, _) = parse_source(source);
        let optab = OpTable::new([("NOP", 0, 1)]).unwrap();
        let mut engine = PassEngine::new(&lines, &optab, AssemblerConfig::default());
        let text: Vec<&str> = source.lines().collect();

        let mut writer = ListingWriter::new(Vec::new());
        writer.header("trace").unwrap();
        loop {
            let (snapshot, done) = engine.step();
            let src = snapshot
                .line
                .and_then(|line| text.get(line as usize - 1).copied());
            writer.write_step(&snapshot, src).unwrap();
            if done {
                let counts = PassCounts {
                    lines: 4,
                    records: snapshot.records.len() as u32,
                    errors: snapshot.diagnostics.len() as u32,
                };
                writer.footer(&counts, &snapshot.symbols).unwrap();
                break;
            }
        }

        let out = String::from_utf8(writer.out).unwrap();
        let listing: Vec<&str> = out.lines().collect();
        assert_eq!(listing[3], "   1  000000  P: START");
        assert_eq!(listing[4], "              > H P 000000");
        assert_eq!(listing[5], "   2  000000   FOO");
        assert_eq!(
            listing[6],
            "              ! 2: ERROR - [P:000000] unknown mnemonic 'FOO'"
        );
        assert_eq!(listing[7], "   3  000001   NOP");
        assert_eq!(listing[8], "              > T 000000 1 00");
        assert_eq!(listing[9], "   4  000001   END");
        assert_eq!(listing[10], "              > E 000000");
        assert_eq!(listing[11], "----  000001  <end of pass>");
        assert!(out.contains("Lines: 4  Records: 3  Errors: 1"));
        assert!(out.contains("SYMBOL TABLE"));
    }
}
