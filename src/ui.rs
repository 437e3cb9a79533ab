//! Terminal output for batch results.
//!
//! [`Table`] draws a bordered table that shrinks its widest columns to fit
//! the terminal. Cells may contain ANSI colors; widths are measured on the
//! visible text.

use colored::*;
use console::{measure_text_width, truncate_str};

/// Narrowest a column is squeezed to when the terminal is too small.
const MIN_COLUMN: usize = 8;

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Rows with the wrong number of cells are dropped.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row.into_iter().map(|c| flatten(&c)).collect());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        for line in self.render(term_width as usize) {
            println!("{}", line);
        }
    }

    /// Lines of the table, fitted to `max_width` columns where possible.
    pub fn render(&self, max_width: usize) -> Vec<String> {
        if self.headers.is_empty() {
            return Vec::new();
        }

        let widths = self.column_widths(max_width);
        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}", left, segments.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| {
            let mut out = String::from("  │");
            for (cell, &width) in cells.iter().zip(&widths) {
                let text = truncate_str(cell, width, "...");
                let padding = width.saturating_sub(measure_text_width(&text));
                let text = if bold {
                    text.bold().to_string()
                } else {
                    text.to_string()
                };
                out.push_str(&format!(" {}{} │", text, " ".repeat(padding)));
            }
            out
        };

        let mut lines = vec![border("┌", "┬", "┐"), line(&self.headers, true)];
        lines.push(border("├", "┼", "┤"));
        for row in &self.rows {
            lines.push(line(row, false));
        }
        lines.push(border("└", "┴", "┘"));
        lines
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(measure_text_width(cell));
            }
        }

        // Indent, outer borders, and " x │" padding around every cell
        let overhead = 3 + 3 * widths.len();
        let available = max_width.saturating_sub(overhead);
        while widths.iter().sum::<usize>() > available {
            let Some(widest) = widths
                .iter_mut()
                .filter(|w| **w > MIN_COLUMN)
                .max_by_key(|w| **w)
            else {
                break;
            };
            *widest -= 1;
        }
        widths
    }
}

fn flatten(cell: &str) -> String {
    cell.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}
