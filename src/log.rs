// This file contains functions for writing nicely formatted output to stderr.

// Copyright 2026 the metasm developers

// This file is part of metasm. metasm is free software: you can redistribute it and/or modify it
// under the terms of the GNU General Public License as published by the Free Software Foundation,
// either version 3 of the License, or (at your option) any later version. metasm is distributed
// in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty
// of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for
// more details. You should have received a copy of the GNU General Public License along with
// metasm. If not, see <http://www.gnu.org/licenses/>.

use chrono::prelude::*;
use colored::Colorize;


pub fn section_header(text: &str) {
    let now = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let date = format!("({})", now);
    eprintln!();
    eprintln!("{} {}", text.bold().yellow().underline(), date.dimmed());
}


pub fn explanation(text: &str) {
    let width = terminal_width();
    let wrapped = textwrap::fill(text, width);
    eprintln!("{}", wrapped.dimmed());
    eprintln!();
}


pub fn warning(text: &str) {
    eprintln!("{} {}", "Warning:".bold().red(), text);
    eprintln!();
}


fn terminal_width() -> usize {
    // Wrap text to the terminal, but keep lines readable on very wide terminals.
    match term_size::dimensions() {
        Some((w, _)) => w.clamp(40, 100),
        None => 80,
    }
}
