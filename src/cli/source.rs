//! Log source commands

use panther_seim::Value;
use tabled::Tabled;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, PaginationArgs};
use crate::output::{Formattable, Listing, Record, cell};

/// Log source row for table output.
#[derive(Debug, Clone, Tabled)]
pub struct SourceRow {
    #[tabled(rename = "SOURCE ID")]
    pub id: String,
    #[tabled(rename = "LABEL")]
    pub label: String,
    #[tabled(rename = "TYPE")]
    pub kind: String,
    #[tabled(rename = "HEALTHY")]
    pub healthy: String,
    #[tabled(rename = "LAST EVENT")]
    pub last_event: String,
}

impl From<&Value> for SourceRow {
    fn from(source: &Value) -> Self {
        Self {
            id: cell(source, "integrationId"),
            label: cell(source, "integrationLabel"),
            kind: cell(source, "integrationType"),
            healthy: cell(source, "isHealthy"),
            last_event: cell(source, "lastEventReceivedAtTime"),
        }
    }
}

pub async fn list(opts: &GlobalOptions, pagination: &PaginationArgs) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let sources = pagination.collect(ctx.client.sources().list()).await?;
    Listing::new(&sources, |v| SourceRow::from(v)).print(ctx.format)
}

pub async fn get(opts: &GlobalOptions, id: &str) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let source = ctx.client.sources().get(id).await?;
    Record(source).print(ctx.format)
}
