//! Alerts

use std::fmt;
use std::str::FromStr;

use futures::stream::BoxStream;
use indexmap::IndexMap;
use log::debug;
use serde_json::json;

use crate::client::pagination::PageExtractor;
use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::{ApiError, Result};
use crate::input::{TimeInput, ids, is_email, validate_email, validate_timestamp};
use crate::normalize::{ShapeMapping, UnionSpec};
use crate::queries::alerts as docs;

/// Workflow status of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertStatus {
    Open,
    Triaged,
    Closed,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Open => "OPEN",
            AlertStatus::Triaged => "TRIAGED",
            AlertStatus::Closed => "CLOSED",
            AlertStatus::Resolved => "RESOLVED",
        }
    }
}

impl FromStr for AlertStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OPEN" => Ok(AlertStatus::Open),
            "TRIAGED" => Ok(AlertStatus::Triaged),
            "CLOSED" => Ok(AlertStatus::Closed),
            "RESOLVED" => Ok(AlertStatus::Resolved),
            _ => Err(ApiError::validation(format!("Invalid status: {s}"))),
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Markup of an alert comment body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentFormat {
    #[default]
    PlainText,
    Html,
}

impl CommentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentFormat::PlainText => "PLAIN_TEXT",
            CommentFormat::Html => "HTML",
        }
    }
}

impl FromStr for CommentFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PLAIN_TEXT" => Ok(CommentFormat::PlainText),
            "HTML" => Ok(CommentFormat::Html),
            _ => Err(ApiError::validation(format!(
                "Format must be one of 'PLAIN_TEXT', 'HTML'; got '{s}'."
            ))),
        }
    }
}

/// Changes to apply to one or more alerts.
///
/// At least one of status or assignee must be set, and the assignee may be
/// given by ID or by email but not both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertUpdate {
    pub status: Option<AlertStatus>,
    pub assignee_id: Option<String>,
    pub assignee_email: Option<String>,
}

impl AlertUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: AlertStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Assign by ID or email, whichever `assignee` looks like.
    pub fn assignee(self, assignee: impl Into<String>) -> Self {
        let assignee = assignee.into();
        if is_email(&assignee) {
            self.assignee_email(assignee)
        } else {
            self.assignee_id(assignee)
        }
    }

    pub fn assignee_id(mut self, id: impl Into<String>) -> Self {
        self.assignee_id = Some(id.into());
        self
    }

    pub fn assignee_email(mut self, email: impl Into<String>) -> Self {
        self.assignee_email = Some(email.into());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.assignee_id.is_some() && self.assignee_email.is_some() {
            return Err(ApiError::validation(
                "Cannot specify both an assignee ID and an assignee email.",
            )
            .into());
        }
        if self.status.is_none() && self.assignee_id.is_none() && self.assignee_email.is_none() {
            return Err(ApiError::validation("Nothing to update: supply a status or an assignee.").into());
        }
        if let Some(email) = &self.assignee_email {
            validate_email(email)?;
        }
        Ok(())
    }
}

fn alert_shape() -> ShapeMapping {
    ShapeMapping::new()
        .union("origin", UnionSpec::typename(&["Detection", "SystemError"]))
        .union("updatedBy", UnionSpec::typename(&["User", "APIToken"]))
}

pub struct Alerts<'a> {
    client: &'a Panther,
}

impl<'a> Alerts<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    /// Every alert created between `start` and `end`, oldest page first.
    pub fn list(
        &self,
        start: impl Into<TimeInput>,
        end: impl Into<TimeInput>,
    ) -> Result<BoxStream<'static, Result<Value>>> {
        let start = validate_timestamp(start)?;
        let end = validate_timestamp(end)?;

        let template = RequestDescriptor::query(docs::LIST).param(
            "input",
            json!({"createdAtAfter": start, "createdAtBefore": end, "cursor": null}),
        );
        Ok(self.client.paginate(
            template,
            PageExtractor::connection("alerts").cursor_param("input.cursor"),
            alert_shape(),
        ))
    }

    /// One alert. The ID must be a UUID, dashed or bare hex; anything else is
    /// an [`ApiError::Validation`] returned before any request is made.
    pub async fn get(&self, id: &str) -> Result<Value> {
        let id = ids::to_hex(id)?;
        let request = RequestDescriptor::query(docs::GET).param("id", id);
        self.client.execute(request, &alert_shape().unwrap("alert")).await
    }

    /// Comment on an alert.
    pub async fn add_comment(&self, id: &str, body: &str, format: CommentFormat) -> Result<Value> {
        let id = ids::to_hex(id)?;
        let request = RequestDescriptor::mutation(docs::ADD_COMMENT).param(
            "input",
            json!({"alertId": id, "body": body, "format": format.as_str()}),
        );
        self.client
            .execute(request, &ShapeMapping::new().unwrap("createAlertComment.comment"))
            .await
    }

    /// Apply `update` to every alert in `ids`.
    ///
    /// Status and assignee are separate server calls; their results are merged
    /// per alert, in the order alerts first appear.
    pub async fn update(&self, alert_ids: &[&str], update: AlertUpdate) -> Result<Vec<Value>> {
        update.validate()?;
        if alert_ids.is_empty() {
            return Err(ApiError::validation("At least one alert ID is required.").into());
        }
        let alert_ids = alert_ids
            .iter()
            .map(|id| ids::to_hex(id))
            .collect::<Result<Vec<_>>>()?;

        let mut calls = Vec::new();
        if let Some(email) = &update.assignee_email {
            calls.push((
                docs::UPDATE_ASSIGNEE_BY_EMAIL,
                "updateAlertsAssigneeByEmail.alerts",
                json!({"ids": alert_ids, "assigneeEmail": email}),
            ));
        }
        if let Some(assignee) = &update.assignee_id {
            calls.push((
                docs::UPDATE_ASSIGNEE_BY_ID,
                "updateAlertsAssigneeById.alerts",
                json!({"ids": alert_ids, "assigneeId": assignee}),
            ));
        }
        if let Some(status) = update.status {
            calls.push((
                docs::UPDATE_STATUS,
                "updateAlertStatusById.alerts",
                json!({"ids": alert_ids, "status": status.as_str()}),
            ));
        }

        let mut merged: IndexMap<String, IndexMap<String, Value>> = IndexMap::new();
        for (document, result_path, input) in calls {
            let request = RequestDescriptor::mutation(document).param("input", input);
            let updated = self
                .client
                .execute(request, &ShapeMapping::new().unwrap(result_path))
                .await?;
            for alert in updated.as_list().unwrap_or_default() {
                let (Some(id), Some(fields)) = (alert.get("id").and_then(Value::as_str), alert.as_map())
                else {
                    continue;
                };
                merged
                    .entry(id.to_string())
                    .or_default()
                    .extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
        }
        debug!("Updated {} alerts", merged.len());

        Ok(merged.into_values().map(Value::Map).collect())
    }
}
