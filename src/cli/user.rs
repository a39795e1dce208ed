//! User commands

use log::debug;
use panther_seim::Value;
use tabled::Tabled;

use crate::cli::args::GlobalOptions;
use crate::cli::{CommandContext, PaginationArgs};
use crate::output::{Formattable, Listing, Record, cell};

/// User row for table output.
#[derive(Debug, Clone, Tabled)]
pub struct UserRow {
    #[tabled(rename = "USER ID")]
    pub id: String,
    #[tabled(rename = "EMAIL")]
    pub email: String,
    #[tabled(rename = "NAME")]
    pub name: String,
    #[tabled(rename = "ROLE")]
    pub role: String,
    #[tabled(rename = "STATUS")]
    pub status: String,
}

impl From<&Value> for UserRow {
    fn from(user: &Value) -> Self {
        let name = [cell(user, "givenName"), cell(user, "familyName")]
            .into_iter()
            .filter(|part| part != "-")
            .collect::<Vec<_>>()
            .join(" ");
        Self {
            id: cell(user, "id"),
            email: cell(user, "email"),
            name,
            role: cell(user, "role.name"),
            status: cell(user, "status"),
        }
    }
}

pub async fn list(opts: &GlobalOptions, pagination: &PaginationArgs) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let users = ctx.client.users().list().await?;
    let users = pagination.apply(users.as_list().map(<[Value]>::to_vec).unwrap_or_default());
    debug!("Fetched {} users", users.len());

    Listing::new(&users, |v| UserRow::from(v)).print(ctx.format)
}

pub async fn get(opts: &GlobalOptions, user: &str) -> anyhow::Result<()> {
    let ctx = CommandContext::new(opts)?;
    let user = ctx.client.users().get(user).await?;
    Record(user).print(ctx.format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_row_joins_name() {
        let user = Value::from(json!({
            "id": "u1",
            "email": "ann@acme.io",
            "givenName": "Ann",
            "familyName": null,
            "role": {"name": "Admin"}
        }));
        let row = UserRow::from(&user);
        assert_eq!(row.name, "Ann");
        assert_eq!(row.role, "Admin");
        assert_eq!(row.status, "-");
    }
}
