// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for sicforge.

fn main() {
    let use_color = std::env::var("NO_COLOR").is_err();
    if let Err(err) = sicforge::assembler::run() {
        for diag in err.diagnostics() {
            eprintln!(
                "{}",
                diag.format_with_context(Some(err.source_lines()), use_color)
            );
        }
        eprintln!("{err}");
        std::process::exit(1);
    }
}
