//! Output formatters for page results
//!
//! Renders rows either as an aligned, optionally colored table or as pretty
//! JSON. Each page type describes its own columns through [`TableRow`].

use chrono::NaiveDate;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

use crate::error::Result;

/// Maximum column width before truncation
const MAX_COLUMN_WIDTH: usize = 40;

/// Output format for page results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// A row that knows how to lay itself out in a table.
pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

/// Formats page results for display
pub struct OutputFormatter {
    format: OutputFormat,
    color: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, color: bool) -> Self {
        Self { format, color }
    }

    /// Truncate a string to max width with ellipsis
    fn truncate_value(value: &str, max_width: usize) -> String {
        if value.chars().count() <= max_width {
            value.to_string()
        } else if max_width <= 3 {
            value.chars().take(max_width).collect()
        } else {
            let take = max_width - 3;
            format!("{}...", value.chars().take(take).collect::<String>())
        }
    }

    /// Format a list of rows
    pub fn format_rows<T: TableRow + Serialize>(&self, rows: &[T]) -> Result<String> {
        match self.format {
            OutputFormat::Table => Ok(self.format_table(T::headers(), rows)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        }
    }

    /// Format a single serializable value (metrics, whoami, mutation result)
    pub fn format_value<T: Serialize>(&self, value: &T, lines: &[(&str, String)]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Table => {
                let width = lines.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
                let out = lines
                    .iter()
                    .map(|(key, val)| {
                        let label = format!("{:<width$}", key, width = width);
                        format!("{}  {}", self.paint_label(&label), val)
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                Ok(out)
            },
        }
    }

    /// One-line confirmation for mutations
    pub fn success(&self, message: &str) -> String {
        if self.color {
            format!("{} {}", "✓".green().bold(), message)
        } else {
            message.to_string()
        }
    }

    pub fn error(&self, message: &str) -> String {
        if self.color {
            format!("{} {}", "ERROR".red().bold(), message)
        } else {
            format!("ERROR {}", message)
        }
    }

    fn paint_label(&self, label: &str) -> String {
        if self.color {
            label.bold().to_string()
        } else {
            label.to_string()
        }
    }

    fn format_table<T: TableRow>(&self, headers: &[&str], rows: &[T]) -> String {
        if rows.is_empty() {
            return "(no rows)".to_string();
        }

        let string_rows: Vec<Vec<String>> = rows
            .iter()
            .map(|row| {
                row.cells()
                    .iter()
                    .map(|cell| Self::truncate_value(&cell.replace('\n', " "), MAX_COLUMN_WIDTH))
                    .collect()
            })
            .collect();

        let mut col_widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
        for row in &string_rows {
            for (i, cell) in row.iter().enumerate().take(col_widths.len()) {
                col_widths[i] = col_widths[i].max(cell.chars().count());
            }
        }

        let pad = |text: &str, width: usize| {
            let fill = width.saturating_sub(text.chars().count());
            format!("{}{}", text, " ".repeat(fill))
        };

        let header_line = headers
            .iter()
            .zip(&col_widths)
            .map(|(h, w)| self.paint_label(&pad(h, *w)))
            .collect::<Vec<_>>()
            .join(" | ");
        let separator = col_widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-");

        let mut output = format!("{}\n{}\n", header_line, separator);
        for row in &string_rows {
            let line = row
                .iter()
                .zip(&col_widths)
                .map(|(cell, w)| pad(cell, *w))
                .collect::<Vec<_>>()
                .join(" | ");
            output.push_str(line.trim_end());
            output.push('\n');
        }

        let count = rows.len();
        output.push_str(&format!(
            "({} row{})",
            count,
            if count == 1 { "" } else { "s" }
        ));
        output
    }
}

/// `YYYY-MM-DD` or an RFC 3339 timestamp as `dd/mm/YYYY`.
///
/// Empty input gives an empty string; unparseable input is returned as is.
pub fn format_date_br(value: Option<&str>) -> String {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return String::new();
    };
    let day = value.split('T').next().unwrap_or(value);
    match NaiveDate::parse_from_str(day, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => value.to_string(),
    }
}

/// `#` plus the first eight characters of an id, uppercased.
pub fn short_id(id: Option<&str>) -> String {
    match id.filter(|id| !id.is_empty()) {
        Some(id) => format!("#{}", id.chars().take(8).collect::<String>().to_uppercase()),
        None => "#--------".to_string(),
    }
}

/// Brazilian currency, e.g. `R$ 1.234,50`.
pub fn format_brl(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let (units, frac) = (cents / 100, cents % 100);

    let digits = units.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{}R$ {},{:02}", if negative { "-" } else { "" }, grouped, frac)
}
