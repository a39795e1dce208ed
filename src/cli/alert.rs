//! Alert commands

use chrono::{Duration, Utc};
use colored::Colorize;
use log::debug;
use panther_seim::Value;
use panther_seim::api::{AlertStatus, AlertUpdate, CommentFormat};
use panther_seim::input::TimeInput;
use tabled::Tabled;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat, PaginationArgs};
use crate::output::{Formattable, Listing, Record, cell};

/// Default look-back window for `alert list` and `metrics`, in days
pub(crate) const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Alert row for table output.
#[derive(Debug, Clone, Tabled)]
pub struct AlertRow {
    #[tabled(rename = "ALERT ID")]
    pub id: String,
    #[tabled(rename = "SEVERITY")]
    pub severity: String,
    #[tabled(rename = "STATUS")]
    pub status: String,
    #[tabled(rename = "TITLE")]
    pub title: String,
    #[tabled(rename = "CREATED")]
    pub created_at: String,
    #[tabled(rename = "ASSIGNEE")]
    pub assignee: String,
}

impl From<&Value> for AlertRow {
    fn from(alert: &Value) -> Self {
        Self {
            id: cell(alert, "id"),
            severity: cell(alert, "severity"),
            status: cell(alert, "status"),
            title: cell(alert, "title"),
            created_at: cell(alert, "createdAt"),
            assignee: cell(alert, "assignee.email"),
        }
    }
}

/// Epoch seconds when `raw` is all digits, otherwise a timestamp string.
pub(crate) fn time_arg(raw: &str) -> TimeInput {
    match raw.parse::<i64>() {
        Ok(epoch) => TimeInput::Epoch(epoch),
        Err(_) => TimeInput::Iso(raw.to_string()),
    }
}

pub async fn list(
    opts: &GlobalOptions,
    start: Option<&str>,
    end: Option<&str>,
    pagination: &PaginationArgs,
) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;

    let now = Utc::now();
    let start = start.map(time_arg).unwrap_or_else(|| {
        TimeInput::At(now - Duration::days(DEFAULT_WINDOW_DAYS))
    });
    let end = end.map(time_arg).unwrap_or(TimeInput::At(now));

    let alerts = pagination.collect(ctx.client.alerts().list(start, end)?).await?;
    debug!("Fetched {} alerts", alerts.len());

    Listing::new(&alerts, |v| AlertRow::from(v)).print(ctx.format)
}

pub async fn get(opts: &GlobalOptions, id: &str) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let alert = ctx.client.alerts().get(id).await?;
    Record(alert).print(ctx.format)
}

pub async fn comment(opts: &GlobalOptions, id: &str, body: &str, html: bool) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let format = if html {
        CommentFormat::Html
    } else {
        CommentFormat::PlainText
    };
    let comment = ctx.client.alerts().add_comment(id, body, format).await?;
    Record(comment).print(ctx.format)
}

pub async fn update(
    opts: &GlobalOptions,
    ids: &[String],
    status: Option<&str>,
    assignee: Option<&str>,
) -> anyhow::Result<()> {
    let mut changes = AlertUpdate::new();
    if let Some(status) = status {
        changes = changes.status(status.parse::<AlertStatus>()?);
    }
    if let Some(assignee) = assignee {
        changes = changes.assignee(assignee);
    }

    let ctx = CommandContext::new(opts)?;
    let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    let updated = ctx.client.alerts().update(&ids, changes).await?;

    if ctx.format != OutputFormat::Json {
        eprintln!("{} Updated {} alert(s)", "✓".green(), updated.len());
    }
    Listing::new(&updated, |v| AlertRow::from(v)).print(ctx.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_time_arg() {
        assert!(matches!(time_arg("1700000000"), TimeInput::Epoch(1_700_000_000)));
        assert!(matches!(time_arg("2024-01-01T00:00:00Z"), TimeInput::Iso(_)));
    }

    #[test]
    fn test_alert_row() {
        let alert = Value::from(json!({
            "id": "abc",
            "severity": "HIGH",
            "status": "OPEN",
            "title": "Root login",
            "createdAt": "2024-01-01T00:00:00Z",
            "assignee": null
        }));
        let row = AlertRow::from(&alert);
        assert_eq!(row.id, "abc");
        assert_eq!(row.severity, "HIGH");
        assert_eq!(row.assignee, "-");
    }
}
