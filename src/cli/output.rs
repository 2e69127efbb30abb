//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Table
            } else {
                OutputFormat::Auto
            }
        }
        other => other,
    }
}

/// Print a value as JSON or YAML
pub fn print_structured<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
        }
        _ => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
        }
    }
    Ok(())
}

/// Rows rendered as a rounded table or CSV
pub struct ListTable {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl ListTable {
    pub fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn print(self, format: OutputFormat) -> Result<()> {
        if format == OutputFormat::Csv {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(&self.headers).into_diagnostic()?;
            for row in &self.rows {
                writer.write_record(row).into_diagnostic()?;
            }
            writer.flush().into_diagnostic()?;
            return Ok(());
        }

        let count = self.rows.len();
        println!("{}", self.render());
        println!("{} row(s)", style(count).cyan());
        Ok(())
    }

    /// Rounded table as text
    pub fn render(self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.iter().map(|h| h.to_string()));
        for row in self.rows {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        table.to_string()
    }
}

/// Emit a list in the requested format
///
/// `row` builds the table/CSV cells, `id` the value printed by `--format id`.
pub fn emit_list<T, R, I>(
    items: &[T],
    format: OutputFormat,
    headers: &[&'static str],
    empty: &str,
    row: R,
    id: I,
) -> Result<()>
where
    T: Serialize,
    R: Fn(&T) -> Vec<String>,
    I: Fn(&T) -> String,
{
    match effective_format(format, true) {
        OutputFormat::Json | OutputFormat::Yaml => print_structured(items, format),
        OutputFormat::Id => {
            for item in items {
                println!("{}", id(item));
            }
            Ok(())
        }
        fmt => {
            if items.is_empty() && fmt != OutputFormat::Csv {
                println!("{}", style(empty).dim());
                return Ok(());
            }
            let mut table = ListTable::new(headers);
            for item in items {
                table.push(row(item));
            }
            table.print(fmt)
        }
    }
}

/// Emit a single record; `pretty` renders the human view
pub fn emit_one<T, P>(value: &T, format: OutputFormat, id: &str, pretty: P) -> Result<()>
where
    T: Serialize,
    P: FnOnce(),
{
    match effective_format(format, false) {
        OutputFormat::Json | OutputFormat::Yaml | OutputFormat::Csv => {
            print_structured(value, format)
        }
        OutputFormat::Id => {
            println!("{}", id);
            Ok(())
        }
        _ => {
            pretty();
            Ok(())
        }
    }
}

/// Section heading with the rule used by every details view
pub fn heading(title: &str) {
    println!("{}", style(title).bold());
    println!("{}", style("─".repeat(60)).dim());
}

/// `label: value` line of a details view
pub fn field(label: &str, value: impl std::fmt::Display) {
    println!("{:<18} {}", style(format!("{}:", label)).bold(), value);
}
