//! Datalake query commands

use std::time::Duration;

use anyhow::bail;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use panther_seim::api::{QueryResults, QueryStatus};

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, OutputFormat, PaginationArgs};
use crate::output::{DynamicRows, Formattable};

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let bar = ProgressBar::new_spinner();
    bar.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")?);
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    Ok(bar)
}

fn print_results(results: QueryResults, format: OutputFormat, pagination: &PaginationArgs) -> anyhow::Result<()> {
    match results.status {
        QueryStatus::Succeeded => {
            let rows = pagination.apply(results.rows.unwrap_or_default());
            DynamicRows(rows).print(format)
        }
        QueryStatus::Running => {
            println!("{} Query is still running", "○".dimmed());
            Ok(())
        }
        QueryStatus::Failed | QueryStatus::Cancelled => {
            bail!("query {}: {}", results.status, results.message)
        }
    }
}

/// Run `sql` and print its rows once it finishes.
pub async fn run(
    opts: &GlobalOptions,
    sql: &str,
    poll_secs: u64,
    pagination: &PaginationArgs,
) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;

    let bar = spinner("Running query")?;
    let results = ctx
        .client
        .queries()
        .execute_and_wait(sql, Duration::from_secs(poll_secs.max(1)))
        .await;
    bar.finish_and_clear();

    let results = results?;
    debug!("Query finished with status {}", results.status);
    print_results(results, ctx.format, pagination)
}

pub async fn results(opts: &GlobalOptions, id: &str) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let results = ctx.client.queries().results(id).await?;
    print_results(results, ctx.format, &PaginationArgs::default())
}
