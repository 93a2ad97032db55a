use std::io::{self, Write};

use ferrofolio_core::Envelope;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Column-aligned view of a command's data for `--format table`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    footer: Vec<String>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            footer: Vec::new(),
        }
    }

    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    /// Free-form line printed below the rows.
    pub fn push_footer(&mut self, line: impl Into<String>) {
        self.footer.push(line.into());
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (index, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(index) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }

    pub fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        let widths = self.widths();
        write_line(out, &self.headers, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(out, &rule, &widths)?;
        for row in &self.rows {
            write_line(out, row, &widths)?;
        }
        for line in &self.footer {
            writeln!(out, "{line}")?;
        }
        Ok(())
    }
}

fn write_line(out: &mut impl Write, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(index, (cell, width))| {
            // First column is a label; the rest are numbers.
            if index == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

pub fn render(
    envelope: &Envelope<Value>,
    table: Option<&Table>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(&mut out, envelope, table)?,
    }

    Ok(())
}

fn render_table(
    out: &mut impl Write,
    envelope: &Envelope<Value>,
    table: Option<&Table>,
) -> Result<(), CliError> {
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(out, "generated_at: {}", envelope.meta.generated_at)?;
    if let Some(source) = &envelope.meta.source {
        writeln!(out, "source      : {source}")?;
    }
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;
    writeln!(out, "cache_hit   : {}", envelope.meta.cache_hit)?;

    if !envelope.meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    writeln!(out)?;
    match table {
        Some(table) => table.write_to(out)?,
        None => {
            let pretty_data = serde_json::to_string_pretty(&envelope.data)?;
            for line in pretty_data.lines() {
                writeln!(out, "  {line}")?;
            }
        }
    }

    if !envelope.errors.is_empty() {
        writeln!(out, "errors:")?;
        for error in &envelope.errors {
            writeln!(out, "  - {}: {}", error.code, error.message)?;
        }
    }

    Ok(())
}

/// `1234.5` as `1,234.50`.
pub fn money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (integer, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (index, ch) in integer.chars().enumerate() {
        if index > 0 && (integer.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

pub fn percent(value: f64) -> String {
    format!("{value:.2}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "0.00");
        assert_eq!(money(999.999), "1,000.00");
        assert_eq!(money(1234567.891), "1,234,567.89");
        assert_eq!(money(-1500.5), "-1,500.50");
        assert_eq!(money(-0.001), "0.00");
    }

    #[test]
    fn table_aligns_columns() {
        let mut table = Table::new(["symbol", "value"]);
        table.push_row(["VT", "1,000.00"]);
        table.push_row(["WEGE3.SA", "12.00"]);
        table.push_footer("total 1,012.00");

        let mut buffer = Vec::new();
        table.write_to(&mut buffer).expect("write to memory");
        let rendered = String::from_utf8(buffer).expect("utf8");

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "symbol       value");
        assert_eq!(lines[1], "--------  --------");
        assert_eq!(lines[2], "VT        1,000.00");
        assert_eq!(lines[3], "WEGE3.SA     12.00");
        assert_eq!(lines[4], "total 1,012.00");
    }
}
