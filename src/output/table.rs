//! Table output formatting

use colored::Colorize;
use panther_seim::Value;
use tabled::{
    Table, Tabled,
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

const NO_RESULTS: &str = "No results found.";

/// Format data as a rounded table
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut table = Table::new(data);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    table.to_string()
}

/// Format data as borderless columns, one line per row
pub fn format_plain<T: Tabled>(data: &[T]) -> String {
    if data.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut table = Table::new(data);
    table.with(Style::blank());
    table.to_string()
}

/// Format rows whose columns come from the data: the keys of the first row, in order.
pub fn format_dynamic(rows: &[Value], rounded: bool) -> String {
    let Some(columns) = rows.first().and_then(Value::as_map) else {
        return NO_RESULTS.to_string();
    };
    let columns: Vec<String> = columns.keys().cloned().collect();

    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_uppercase()));
    for row in rows {
        builder.push_record(columns.iter().map(|c| match row.get(c) {
            Some(v) if !v.is_null() => v.display(),
            _ => String::new(),
        }));
    }

    let mut table = builder.build();
    if rounded {
        table.with(Style::rounded());
    } else {
        table.with(Style::blank());
    }
    table.to_string()
}

/// Format one record as aligned `key: value` lines
pub fn format_record(record: &Value) -> String {
    let Some(fields) = record.as_map() else {
        return record.display();
    };
    let width = fields.keys().map(String::len).max().unwrap_or(0);

    fields
        .iter()
        .map(|(key, value)| {
            let shown = if value.is_null() {
                "-".dimmed().to_string()
            } else {
                value.display()
            };
            format!("{:>width$}  {}", key.bold(), shown, width = width)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
