//! Datalake database commands

use panther_seim::Value;
use tabled::Tabled;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::output::{Formattable, Listing, cell};

/// Database row for table output.
#[derive(Debug, Clone, Tabled)]
pub struct DatabaseRow {
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "DESCRIPTION")]
    pub description: String,
}

impl From<&Value> for DatabaseRow {
    fn from(database: &Value) -> Self {
        Self {
            name: cell(database, "name"),
            description: cell(database, "description"),
        }
    }
}

pub async fn list(opts: &GlobalOptions) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let databases = ctx.client.databases().list().await?;
    Listing::new(databases.as_list().unwrap_or_default(), |v| DatabaseRow::from(v)).print(ctx.format)
}
