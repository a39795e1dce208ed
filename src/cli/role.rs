//! Role commands

use panther_seim::Value;
use tabled::Tabled;

use crate::cli::CommandContext;
use crate::cli::args::GlobalOptions;
use crate::output::{Formattable, Listing, cell};

/// Role row for table output.
#[derive(Debug, Clone, Tabled)]
pub struct RoleRow {
    #[tabled(rename = "ROLE ID")]
    pub id: String,
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "PERMISSIONS")]
    pub permissions: usize,
    #[tabled(rename = "UPDATED BY")]
    pub updated_by: String,
}

impl From<&Value> for RoleRow {
    fn from(role: &Value) -> Self {
        // API tokens have a name, users an email
        let updated_by = match role.pointer("updatedBy.email") {
            Some(email) if !email.is_null() => email.display(),
            _ => cell(role, "updatedBy.name"),
        };
        Self {
            id: cell(role, "id"),
            name: cell(role, "name"),
            permissions: role
                .get("permissions")
                .and_then(Value::as_list)
                .map_or(0, <[Value]>::len),
            updated_by,
        }
    }
}

pub async fn list(opts: &GlobalOptions, name_contains: Option<&str>) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let roles = ctx.client.roles().list(name_contains).await?;
    let roles = roles.as_list().unwrap_or_default();

    Listing::new(roles, |v| RoleRow::from(v)).print(ctx.format)
}
