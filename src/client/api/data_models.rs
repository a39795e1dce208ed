//! Data models, over the REST API

use futures::stream::BoxStream;
use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue, json};

use crate::client::pagination::{PageExtractor, REST_PAGE_SIZE};
use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::{ApiError, Result};
use crate::normalize::ShapeMapping;

const RESOURCE: &str = "data_models";

/// Body of a data model create or update.
///
/// `mappings` maps a standard field name to either a JSON path (starting
/// with `$.`) or the name of a Python method in `body`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataModelSpec {
    pub body: String,
    pub description: Option<String>,
    pub display_name: Option<String>,
    pub enabled: Option<bool>,
    pub log_types: Vec<String>,
    pub mappings: IndexMap<String, String>,
}

impl DataModelSpec {
    fn to_payload(&self, id: &str) -> Map<String, JsonValue> {
        let mut payload = Map::new();
        payload.insert("id".to_string(), JsonValue::from(id));
        // the API rejects payloads without a body, even an empty one
        payload.insert("body".to_string(), JsonValue::from(self.body.as_str()));
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            payload.insert("description".to_string(), JsonValue::from(description));
        }
        if let Some(display_name) = &self.display_name {
            payload.insert("displayName".to_string(), JsonValue::from(display_name.as_str()));
        }
        if let Some(enabled) = self.enabled {
            payload.insert("enabled".to_string(), JsonValue::from(enabled));
        }
        if !self.log_types.is_empty() {
            payload.insert("logTypes".to_string(), json!(self.log_types));
        }
        if !self.mappings.is_empty() {
            let mappings: Vec<JsonValue> = self
                .mappings
                .iter()
                .map(|(name, target)| match target.strip_prefix("$.") {
                    Some(path) => json!({"name": name, "path": path}),
                    None => json!({"name": name, "method": target}),
                })
                .collect();
            payload.insert("mappings".to_string(), JsonValue::Array(mappings));
        }
        payload
    }
}

fn model_path(id: &str) -> Result<String> {
    if id.is_empty() || id.contains('/') {
        return Err(ApiError::validation(format!("Invalid data model ID: '{id}'")).into());
    }
    Ok(format!("{RESOURCE}/{id}"))
}

pub struct DataModels<'a> {
    client: &'a Panther,
}

impl<'a> DataModels<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    /// Every data model, fetched 50 at a time.
    pub fn list(&self) -> BoxStream<'static, Result<Value>> {
        self.client.paginate(
            RequestDescriptor::get(RESOURCE).param("limit", REST_PAGE_SIZE),
            PageExtractor::rest("results", "next"),
            ShapeMapping::new(),
        )
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        self.client
            .execute(RequestDescriptor::get(model_path(id)?), &ShapeMapping::new())
            .await
    }

    pub async fn create(&self, id: &str, spec: &DataModelSpec) -> Result<Value> {
        model_path(id)?;
        let request = RequestDescriptor::post(RESOURCE).params(spec.to_payload(id));
        self.client.execute(request, &ShapeMapping::new()).await
    }

    /// Replace a data model, optionally renaming it to `new_id`.
    ///
    /// Panther creates the model when it does not exist; with `update_only` the
    /// call first fetches it and fails if it is missing.
    pub async fn update(
        &self,
        id: &str,
        spec: &DataModelSpec,
        new_id: Option<&str>,
        update_only: bool,
    ) -> Result<Value> {
        let path = model_path(id)?;
        if update_only {
            self.get(id).await?;
        }
        let request = RequestDescriptor::put(path).params(spec.to_payload(new_id.unwrap_or(id)));
        self.client.execute(request, &ShapeMapping::new()).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .send_raw(&RequestDescriptor::delete(model_path(id)?))
            .await?;
        Ok(())
    }
}
