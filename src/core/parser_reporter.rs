// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Reporter for parser errors with source context.

use crate::core::parser::ParseError;

pub fn format_parse_error(err: &ParseError, use_color: bool) -> String {
    let mut out = format!("{}: ERROR\n", err.span.line);
    let highlighted = highlight_line(&err.text, err.span.col_start, use_color);
    out.push_str(&format!("{:>5} | {}", err.span.line, highlighted));
    out.push('\n');
    out.push_str(&format!("ERROR: {}", err.kind));
    out
}

pub fn highlight_line(line: &str, column: usize, use_color: bool) -> String {
    if column == 0 {
        return line.to_string();
    }
    let idx = column.saturating_sub(1);
    if idx >= line.len() || !line.is_char_boundary(idx) {
        if use_color {
            return format!("{line}\x1b[31m^\x1b[0m");
        }
        return format!("{line}^");
    }
    let (head, tail) = line.split_at(idx);
    let ch = tail.chars().next().unwrap_or(' ');
    let rest = &tail[ch.len_utf8()..];
    if use_color {
        format!("{head}\x1b[31m{ch}\x1b[0m{rest}")
    } else {
        format!("{head}{ch}{rest}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse_line;

    #[test]
    fn reports_line_and_message() {
        let err = parse_line("  ADD R1,", 7).unwrap_err();
        let text = format_parse_error(&err, false);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "7: ERROR");
        assert_eq!(lines[1], "    7 |   ADD R1,^");
        assert_eq!(lines[2], "ERROR: expected an operand");
    }

    #[test]
    fn highlight_marks_column_in_color() {
        assert_eq!(highlight_line("abc", 2, true), "a\x1b[31mb\x1b[0mc");
        assert_eq!(highlight_line("abc", 0, true), "abc");
    }
}
