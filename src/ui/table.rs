// linkback is an incremental backup tool
// Copyright (C) 2025  Javier Lancha Vázquez <javier.lancha@gmail.com>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::global;

/// Length of a string as shown in a terminal, ignoring ANSI escape sequences.
fn visible_len(s: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;

    for c in s.chars() {
        if in_escape {
            if c == 'm' {
                in_escape = false;
            }
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            len += 1;
        }
    }
    len
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Alignment {
    Left,
    Right,
}

/// A plain text table with aligned columns.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    alignments: Vec<Alignment>,
}

impl Table {
    pub fn new_with_alignments(alignments: Vec<Alignment>) -> Self {
        Self {
            headers: Vec::new(),
            rows: Vec::new(),
            alignments,
        }
    }

    pub fn set_headers(&mut self, headers: Vec<String>) {
        self.headers = headers;
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn column_widths(&self) -> Vec<usize> {
        let num_columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        let mut widths = vec![0; num_columns];
        for row in std::iter::once(&self.headers).chain(self.rows.iter()) {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(visible_len(cell));
            }
        }
        widths
    }

    fn render_row(&self, row: &[String], widths: &[usize]) -> String {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let padding = " ".repeat(widths[i] - visible_len(cell));
                match self.alignments.get(i).copied().unwrap_or(Alignment::Left) {
                    Alignment::Left => format!("{cell}{padding}"),
                    Alignment::Right => format!("{padding}{cell}"),
                }
            })
            .collect();
        format!(" {} ", cells.join("   ")).trim_end().to_string()
    }

    /// Renders the table to a String.
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        if widths.is_empty() {
            return String::new();
        }

        let line_width = widths.iter().sum::<usize>() + 3 * (widths.len() - 1) + 2;
        let separator = "-".repeat(line_width);

        let mut output = String::new();
        if !self.headers.is_empty() {
            output.push_str(&separator);
            output.push('\n');
            output.push_str(&self.render_row(&self.headers, &widths));
            output.push('\n');
        }
        output.push_str(&separator);
        output.push('\n');
        for row in &self.rows {
            output.push_str(&self.render_row(row, &widths));
            output.push('\n');
        }
        output.push_str(&separator);
        output.push('\n');

        output
    }

    /// Prints the table, unless running quiet.
    pub fn print(&self) {
        if global::verbosity() >= 1 {
            print!("{}", self.render());
        }
    }
}
