//! Output formatting for CLI results

use panther_seim::Value;
use tabled::Tabled;

use crate::cli::OutputFormat;

pub mod json;
pub mod table;

/// Trait for types that can be formatted for output
pub trait Formattable {
    /// Format the data according to the specified format
    fn format(&self, format: OutputFormat) -> anyhow::Result<String>;

    /// Format and print to stdout
    fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        println!("{}", self.format(format)?);
        Ok(())
    }
}

/// Rows rendered as a table, alongside the canonical values they came from.
///
/// JSON output carries the full values; table output carries only the columns.
pub struct Listing<D> {
    pub rows: Vec<D>,
    pub values: Vec<serde_json::Value>,
}

impl<D> Listing<D> {
    pub fn new(values: &[Value], to_row: impl Fn(&Value) -> D) -> Self {
        Self {
            rows: values.iter().map(to_row).collect(),
            values: values.iter().map(Value::to_canonical).collect(),
        }
    }
}

impl<D: Tabled> Formattable for Listing<D> {
    fn format(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Pretty => Ok(table::format_table(&self.rows)),
            OutputFormat::Table => Ok(table::format_plain(&self.rows)),
            OutputFormat::Json => Ok(json::format_json(&self.values)?),
        }
    }
}

/// A single record, shown as `key: value` lines or JSON.
pub struct Record(pub Value);

impl Formattable for Record {
    fn format(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Json => Ok(json::format_json(&self.0.to_canonical())?),
            _ => Ok(table::format_record(&self.0)),
        }
    }
}

/// Rows with columns only known at runtime, such as datalake query results.
pub struct DynamicRows(pub Vec<Value>);

impl Formattable for DynamicRows {
    fn format(&self, format: OutputFormat) -> anyhow::Result<String> {
        match format {
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = self.0.iter().map(Value::to_canonical).collect();
                Ok(json::format_json(&rows)?)
            }
            OutputFormat::Pretty => Ok(table::format_dynamic(&self.0, true)),
            OutputFormat::Table => Ok(table::format_dynamic(&self.0, false)),
        }
    }
}

/// Column text for the value at `path`, or `-` when absent.
pub fn cell(value: &Value, path: &str) -> String {
    match value.pointer(path) {
        Some(v) if !v.is_null() => v.display(),
        _ => "-".to_string(),
    }
}
