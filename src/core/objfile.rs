// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Object-record text output.
//!
//! One line per record:
//!
//! ```text
//! H PROG 000000 1B
//! T 000000 4 09000012
//! M 000001 EXT
//! D OUT 000012
//! R EXT
//! E 000000
//! ```
//!
//! Addresses are six uppercase hex digits; the header size and the text
//! length are unpadded. Instruction operands are padded according to the
//! instruction size: one digit per register of a register pair, two digits
//! for other two-byte operands, four for three-byte and six for four-byte
//! instructions.

use std::fmt;
use std::io::{self, Write};

use crate::core::assembler::record::Record;
use crate::core::operand::Operand;

pub fn format_record(record: &Record) -> String {
    match record {
        Record::Header { name, start, size } => match size {
            Some(size) => format!("H {name} {start:06X} {size:X}"),
            None => format!("H {name} {start:06X}"),
        },
        Record::Text {
            address,
            size,
            opcode,
            operands,
        } => format!(
            "T {address:06X} {size:X} {opcode:02X}{}",
            operand_payload(*size, operands)
        ),
        Record::TextBinary {
            address,
            length,
            payload,
        } => {
            if payload.is_empty() {
                format!("T {address:06X} {length:X}")
            } else {
                format!("T {address:06X} {length:X} {payload}")
            }
        }
        Record::Modification { address, external } => match external {
            Some(name) => format!("M {address:06X} {name}"),
            None => format!("M {address:06X}"),
        },
        Record::Define { name, address } => match address {
            Some(addr) => format!("D {name} {addr:06X}"),
            None => format!("D {name}"),
        },
        Record::Refer { name } => format!("R {name}"),
        Record::End { entry } => format!("E {entry:06X}"),
    }
}

pub fn format_records(records: &[Record]) -> Vec<String> {
    records.iter().map(format_record).collect()
}

fn operand_payload(size: u8, operands: &[Operand]) -> String {
    let width = match size {
        1 => return String::new(),
        2 if !operands.is_empty()
            && operands.iter().all(|op| matches!(op, Operand::Register(_))) =>
        {
            1
        }
        2 => 2,
        3 => 4,
        _ => 6,
    };
    operands
        .iter()
        .map(|op| match op.constant_value() {
            Some(Ok(value)) => format!("{value:0width$X}"),
            _ => op.to_string(),
        })
        .collect()
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_record(self))
    }
}

/// Writes formatted records, one per line.
pub struct ObjectWriter<W: Write> {
    out: W,
}

impl<W: Write> ObjectWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_records(&mut self, records: &[Record]) -> io::Result<()> {
        for record in records {
            writeln!(self.out, "{record}")?;
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(size: u8, opcode: u8, operands: Vec<Operand>) -> Record {
        Record::Text {
            address: 3,
            size,
            opcode,
            operands,
        }
    }

    #[test]
    fn header_and_end() {
        let header = Record::Header {
            name: "PROG".into(),
            start: 0,
            size: Some(0x1B),
        };
        assert_eq!(format_record(&header), "H PROG 000000 1B");
        assert_eq!(format_record(&Record::End { entry: 0x10 }), "E 000010");
    }

    #[test]
    fn instruction_payload_widths() {
        assert_eq!(format_record(&text(1, 0x04, vec![])), "T 000003 1 04");
        assert_eq!(
            format_record(&text(2, 0x04, vec![Operand::Register(1), Operand::Register(10)])),
            "T 000003 2 041A"
        );
        assert_eq!(
            format_record(&text(2, 0x04, vec![Operand::Number(0xFF)])),
            "T 000003 2 04FF"
        );
        assert_eq!(
            format_record(&text(2, 0x04, vec![Operand::CString("A".into())])),
            "T 000003 2 0441"
        );
        assert_eq!(
            format_record(&text(3, 0x0A, vec![Operand::Number(0xFFFD)])),
            "T 000003 3 0AFFFD"
        );
        assert_eq!(
            format_record(&text(4, 0x09, vec![Operand::Number(0x12)])),
            "T 000003 4 09000012"
        );
    }

    #[test]
    fn unresolved_values_render_symbolically() {
        assert_eq!(
            format_record(&text(4, 0x09, vec![Operand::Identifier("LATER".into())])),
            "T 000003 4 09LATER"
        );
        let define = Record::Define {
            name: "OUT".into(),
            address: None,
        };
        assert_eq!(format_record(&define), "D OUT");
    }

    #[test]
    fn binary_and_linkage_records() {
        let reserve = Record::TextBinary {
            address: 3,
            length: 6,
            payload: String::new(),
        };
        assert_eq!(format_record(&reserve), "T 000003 6");
        let word = Record::TextBinary {
            address: 0,
            length: 3,
            payload: "00002A".into(),
        };
        assert_eq!(format_record(&word), "T 000000 3 00002A");
        let modification = Record::Modification {
            address: 1,
            external: Some("FOO".into()),
        };
        assert_eq!(format_record(&modification), "M 000001 FOO");
        let local = Record::Modification {
            address: 1,
            external: None,
        };
        assert_eq!(format_record(&local), "M 000001");
        assert_eq!(format_record(&Record::Refer { name: "FOO".into() }), "R FOO");
    }

    #[test]
    fn writer_emits_one_line_per_record() {
        let mut writer = ObjectWriter::new(Vec::new());
        writer
            .write_records(&[Record::Refer { name: "A".into() }, Record::End { entry: 0 }])
            .unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "R A\nE 000000\n");
    }
}
