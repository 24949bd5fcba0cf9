//! Terminal output helpers.
//!
//! - [`Table`] renders the compiler list with box-drawing borders, shrinking
//!   the widest columns until the table fits the terminal.
//! - [`DetectionSpinner`] reports auto-detection progress with `indicatif`.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::toolchain::{CompilerFamily, DetectionProgress, DetectionReport};

/// Columns never shrink below this many characters.
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

    /// Rows with the wrong number of cells are ignored.
    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn print(&self) {
        let (_, term_width) = console::Term::stdout().size();
        print!("{}", self.render(term_width as usize));
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(visible_width(&sanitize(cell)));
            }
        }

        let overhead = 3 + 3 * self.headers.len();
        let available = max_width.saturating_sub(overhead);
        let mut total: usize = widths.iter().sum();
        while total > available {
            let Some((widest, &width)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
                break;
            };
            if width <= MIN_COLUMN {
                break;
            }
            widths[widest] -= 1;
            total -= 1;
        }
        widths
    }

    /// The table as text, fitted to `max_width` columns where possible.
    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }
        let widths = self.column_widths(max_width);

        let border = |left: &str, mid: &str, right: &str| -> String {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}\n", left, cells.join(mid), right)
        };
        let line = |cells: Vec<String>| -> String {
            let mut s = String::from("  │");
            for (cell, width) in cells.iter().zip(&widths) {
                let padding = width.saturating_sub(visible_width(cell));
                s.push_str(&format!(" {}{} │", cell, " ".repeat(padding)));
            }
            s.push('\n');
            s
        };

        let mut out = border("┌", "┬", "┐");
        out.push_str(&line(
            self.headers
                .iter()
                .zip(&widths)
                .map(|(h, w)| console::truncate_str(h, *w, "...").bold().to_string())
                .collect(),
        ));
        out.push_str(&border("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(
                row.iter()
                    .zip(&widths)
                    .map(|(cell, w)| console::truncate_str(&sanitize(cell), *w, "...").to_string())
                    .collect(),
            ));
        }
        out.push_str(&border("└", "┴", "┘"));
        out
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            _ => c,
        })
        .collect()
}

fn visible_width(s: &str) -> usize {
    console::measure_text_width(s)
}

/// Spinner shown while the probe walks the detection signatures.
pub struct DetectionSpinner {
    bar: ProgressBar,
}

impl DetectionSpinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("◜◠◝◞◡◟"),
        );
        Self { bar }
    }

    /// A spinner that draws nothing, for non-interactive runs.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for DetectionSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionProgress for DetectionSpinner {
    fn begin(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.enable_steady_tick(Duration::from_millis(100));
        self.bar.set_message("Detecting compilers...");
    }

    fn step(&self, family: CompilerFamily, found: &[PathBuf]) {
        self.bar.inc(1);
        self.bar
            .set_message(format!("Looked for {} ({} found)", family, found.len()));
    }

    fn finish(&self, report: &DetectionReport) {
        self.bar.finish_and_clear();
        if report.cancelled {
            println!("{} Compiler detection cancelled", "!".yellow());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_with_wrong_arity_ignored() {
        let mut table = Table::new(&["Id", "Name"]);
        table.add_row(vec!["gcc".to_string()]);
        table.add_row(vec!["gcc".to_string(), "GNU GCC Compiler".to_string()]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_render_contains_cells() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Id", "Name"]);
        table.add_row(vec!["gcc".to_string(), "GNU GCC\nCompiler".to_string()]);
        let out = table.render(120);
        assert!(out.contains("│ gcc │ GNU GCC Compiler │"));
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_render_shrinks_to_width() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Id", "Path"]);
        table.add_row(vec!["gcc".to_string(), "/".repeat(200)]);
        let out = table.render(60);
        for line in out.lines() {
            assert!(console::measure_text_width(line) <= 60, "{}", line);
        }
    }

    #[test]
    fn test_hidden_spinner_accepts_events() {
        let spinner = DetectionSpinner::hidden();
        spinner.begin(2);
        spinner.step(CompilerFamily::GCC, &[PathBuf::from("/usr")]);
        spinner.finish(&DetectionReport::default());
        assert!(!spinner.cancelled());
    }
}
