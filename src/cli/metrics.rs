//! Metrics command

use chrono::{Duration, Utc};
use panther_seim::Value;
use panther_seim::input::TimeInput;
use tabled::Tabled;

use crate::cli::alert::{DEFAULT_WINDOW_DAYS, time_arg};
use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat};
use crate::output::{Formattable, Listing, Record, cell};

/// Alert count per severity for table output.
#[derive(Debug, Clone, Tabled)]
pub struct SeverityRow {
    #[tabled(rename = "SEVERITY")]
    pub severity: String,
    #[tabled(rename = "ALERTS")]
    pub alerts: String,
}

impl From<&Value> for SeverityRow {
    fn from(entry: &Value) -> Self {
        Self {
            severity: cell(entry, "label"),
            alerts: cell(entry, "value"),
        }
    }
}

pub async fn run(
    opts: &GlobalOptions,
    start: Option<&str>,
    end: Option<&str>,
    interval: i64,
) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;

    let now = Utc::now();
    let start = start.map(time_arg).unwrap_or_else(|| {
        TimeInput::At(now - Duration::days(DEFAULT_WINDOW_DAYS))
    });
    let end = end.map(time_arg).unwrap_or(TimeInput::At(now));

    let metrics = ctx.client.metrics().all(start, end, interval).await?;
    if ctx.format == OutputFormat::Json {
        return Record(metrics).print(ctx.format);
    }

    let per_severity = metrics
        .get("alertsPerSeverity")
        .and_then(Value::as_list)
        .unwrap_or_default();
    Listing::new(per_severity, |v| SeverityRow::from(v)).print(ctx.format)?;
    println!("Total alerts: {}", cell(&metrics, "totalAlerts"));
    Ok(())
}
