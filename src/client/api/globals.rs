//! Global helper modules, over the REST API

use futures::stream::BoxStream;
use serde_json::{Map, Value as JsonValue, json};

use crate::client::pagination::{PageExtractor, REST_PAGE_SIZE};
use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::{ApiError, Result};
use crate::normalize::ShapeMapping;

const RESOURCE: &str = "globals";

/// Body of a global helper create or update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalSpec {
    /// Python source of the helper module.
    pub body: String,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl GlobalSpec {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Default::default()
        }
    }

    fn to_payload(&self, id: &str) -> Map<String, JsonValue> {
        let mut payload = Map::new();
        payload.insert("id".to_string(), JsonValue::from(id));
        payload.insert("body".to_string(), JsonValue::from(self.body.as_str()));
        if let Some(description) = &self.description {
            payload.insert("description".to_string(), JsonValue::from(description.as_str()));
        }
        if let Some(tags) = &self.tags {
            payload.insert("tags".to_string(), json!(tags));
        }
        payload
    }
}

fn global_path(id: &str) -> Result<String> {
    if id.is_empty() || id.contains('/') {
        return Err(ApiError::validation(format!("Invalid global ID: '{id}'")).into());
    }
    Ok(format!("{RESOURCE}/{id}"))
}

pub struct Globals<'a> {
    client: &'a Panther,
}

impl<'a> Globals<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    /// Every global helper, fetched 50 at a time.
    pub fn list(&self) -> BoxStream<'static, Result<Value>> {
        self.client.paginate(
            RequestDescriptor::get(RESOURCE).param("limit", REST_PAGE_SIZE),
            PageExtractor::rest("results", "next"),
            ShapeMapping::new(),
        )
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        self.client
            .execute(RequestDescriptor::get(global_path(id)?), &ShapeMapping::new())
            .await
    }

    pub async fn create(&self, id: &str, spec: &GlobalSpec) -> Result<Value> {
        global_path(id)?;
        let request = RequestDescriptor::post(RESOURCE).params(spec.to_payload(id));
        self.client.execute(request, &ShapeMapping::new()).await
    }

    /// Replace a helper. Panther creates it when missing, unless `update_only`
    /// asks for a fetch first.
    pub async fn update(&self, id: &str, spec: &GlobalSpec, update_only: bool) -> Result<Value> {
        let path = global_path(id)?;
        if update_only {
            self.get(id).await?;
        }
        let request = RequestDescriptor::put(path).params(spec.to_payload(id));
        self.client.execute(request, &ShapeMapping::new()).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .send_raw(&RequestDescriptor::delete(global_path(id)?))
            .await?;
        Ok(())
    }
}
