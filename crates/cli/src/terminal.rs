use anyhow::Result;
use crossterm::{
    execute,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use serde::Serialize;
use std::io::{self, Write};

/// Color scheme for terminal output.
struct Colors;

impl Colors {
    const HEADER: Color = Color::Magenta;
    const INFO: Color = Color::DarkGrey;
    const WARNING: Color = Color::Yellow;
}

/// Writes command results to stdout, either as text tables or JSON.
pub struct Terminal {
    json: bool,
}

impl Terminal {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Pretty-printed JSON document.
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let mut stdout = io::stdout();
        serde_json::to_writer_pretty(&mut stdout, value)?;
        writeln!(stdout)?;
        Ok(())
    }

    /// Section title above a table.
    pub fn print_header(&self, title: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::HEADER),
            Print(format!("{}\n", title)),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_table(&self, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        let mut stdout = io::stdout();
        stdout.write_all(render_table(headers, rows).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }

    pub fn print_info(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::INFO),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        Ok(())
    }

    pub fn print_warning(&self, msg: &str) -> Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(Colors::WARNING),
            Print(format!("{}\n", msg)),
            ResetColor,
        )?;
        Ok(())
    }
}

/// Left-aligned plain-text table with a dashed rule under the header.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let mut out = pad_line(headers.iter().copied(), &widths);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&format!("{}\n", rule.join("  ")));
    for row in rows {
        out.push_str(&pad_line(row.iter().map(String::as_str), &widths));
    }
    out
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &w)| format!("{:<w$}", cell, w = w))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

pub fn format_hours(hours: f64) -> String {
    format!("{:.2}", hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_are_padded_to_widest_cell() {
        let rows = vec![
            vec!["Ana".to_string(), format_hours(5.0)],
            vec!["Maximiliano".to_string(), format_hours(12.25)],
        ];
        let table = render_table(&["Technician", "Hours"], &rows);

        assert_eq!(
            table,
            "Technician   Hours\n\
             -----------  -----\n\
             Ana          5.00\n\
             Maximiliano  12.25\n"
        );
    }

    #[test]
    fn empty_table_keeps_header() {
        let table = render_table(&["Client", "Hours"], &[]);
        assert_eq!(table, "Client  Hours\n------  -----\n");
    }
}
