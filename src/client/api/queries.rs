//! Datalake queries

use std::fmt;
use std::time::Duration;

use futures::TryStreamExt;
use log::{debug, info};
use serde_json::Value as JsonValue;

use crate::client::pagination::PageExtractor;
use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::{ApiError, Result};
use crate::input::ids;
use crate::normalize::ShapeMapping;
use crate::queries::queries as docs;

/// Lifecycle of a datalake query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl QueryStatus {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "running" => Some(QueryStatus::Running),
            "succeeded" => Some(QueryStatus::Succeeded),
            "failed" => Some(QueryStatus::Failed),
            "cancelled" => Some(QueryStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, QueryStatus::Running)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Running => "running",
            QueryStatus::Succeeded => "succeeded",
            QueryStatus::Failed => "failed",
            QueryStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a query, and its rows once it has succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResults {
    pub status: QueryStatus,
    pub message: String,
    /// `None` unless the status is `Succeeded`
    pub rows: Option<Vec<Value>>,
}

pub struct Queries<'a> {
    client: &'a Panther,
}

impl<'a> Queries<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    /// Start `sql` in the datalake and return the query ID.
    pub async fn execute(&self, sql: &str) -> Result<String> {
        let request = RequestDescriptor::mutation(docs::EXECUTE).param("sql", sql);
        let id = self
            .client
            .execute(request, &ShapeMapping::new().unwrap("executeDataLakeQuery.id"))
            .await?;
        match id {
            Value::String(id) => {
                info!("Started datalake query {}", id);
                Ok(id)
            }
            other => Err(ApiError::Decode {
                reason: "executeDataLakeQuery returned no id".to_string(),
                body: other.to_canonical().to_string(),
            }
            .into()),
        }
    }

    /// Current status of a query, with every result row when it has succeeded.
    pub async fn results(&self, id: &str) -> Result<QueryResults> {
        let template = RequestDescriptor::query(docs::RESULTS).param("id", ids::to_uuid(id)?);
        let first = self.client.send_raw(&template).await?.into_body();

        let query = first.get("dataLakeQuery").unwrap_or(&JsonValue::Null);
        let raw_status = query.get("status").and_then(JsonValue::as_str).unwrap_or_default();
        let status = QueryStatus::parse(raw_status).ok_or_else(|| ApiError::Decode {
            reason: format!("unknown query status '{raw_status}'"),
            body: query.to_string(),
        })?;
        let message = query
            .get("message")
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string();
        debug!("Query {} is {}", id, status);

        if status != QueryStatus::Succeeded {
            return Ok(QueryResults {
                status,
                message,
                rows: None,
            });
        }

        // the first page is already in hand; the paginator picks up from its cursor
        let extractor = PageExtractor::connection("dataLakeQuery.results");
        let page = extractor.extract(&first);
        let conversions = self.client.active_conversions();
        let shape = ShapeMapping::new();
        let mut rows = page
            .items
            .into_iter()
            .map(|row| shape.normalize(row, conversions.as_deref()))
            .collect::<Result<Vec<_>>>()?;

        if let Some(cursor) = page.next_cursor {
            let rest: Vec<Value> = self
                .client
                .paginate(
                    template.with_cursor(extractor.cursor_param_path(), Some(&cursor)),
                    extractor,
                    shape,
                )
                .try_collect()
                .await?;
            rows.extend(rest);
        }

        Ok(QueryResults {
            status,
            message,
            rows: Some(rows),
        })
    }

    /// Run `sql` and poll every `poll_interval` until it finishes.
    pub async fn execute_and_wait(&self, sql: &str, poll_interval: Duration) -> Result<QueryResults> {
        let id = self.execute(sql).await?;
        loop {
            let results = self.results(&id).await?;
            if results.status.is_terminal() {
                return Ok(results);
            }
            debug!("Query {} still running", id);
            tokio::time::sleep(poll_interval).await;
        }
    }
}
