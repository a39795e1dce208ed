//! Cloud account commands

use panther_seim::Value;
use tabled::Tabled;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, PaginationArgs};
use crate::output::{Formattable, Listing, Record, cell};

/// Cloud account row for table output.
#[derive(Debug, Clone, Tabled)]
pub struct CloudAccountRow {
    #[tabled(rename = "ACCOUNT ID")]
    pub id: String,
    #[tabled(rename = "LABEL")]
    pub label: String,
    #[tabled(rename = "AWS ACCOUNT")]
    pub aws_account_id: String,
    #[tabled(rename = "REALTIME")]
    pub realtime: String,
}

impl From<&Value> for CloudAccountRow {
    fn from(account: &Value) -> Self {
        Self {
            id: cell(account, "id"),
            label: cell(account, "label"),
            aws_account_id: cell(account, "awsAccountId"),
            realtime: cell(account, "isRealtimeScanningEnabled"),
        }
    }
}

pub async fn list(opts: &GlobalOptions, pagination: &PaginationArgs) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let accounts = pagination.collect(ctx.client.cloud_accounts().list()).await?;
    Listing::new(&accounts, |v| CloudAccountRow::from(v)).print(ctx.format)
}

pub async fn get(opts: &GlobalOptions, id: &str) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let account = ctx.client.cloud_accounts().get(id).await?;
    Record(account).print(ctx.format)
}
