//! Log sources

use futures::stream::BoxStream;
use serde_json::json;

use crate::client::pagination::PageExtractor;
use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::Result;
use crate::input::ids;
use crate::normalize::ShapeMapping;
use crate::queries::sources as docs;

pub struct Sources<'a> {
    client: &'a Panther,
}

impl<'a> Sources<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    /// Every log source integration.
    pub fn list(&self) -> BoxStream<'static, Result<Value>> {
        self.client.paginate(
            RequestDescriptor::query(docs::LIST).param("input", json!({"cursor": null})),
            PageExtractor::connection("sources").cursor_param("input.cursor"),
            ShapeMapping::new(),
        )
    }

    pub async fn get(&self, id: &str) -> Result<Value> {
        let request = RequestDescriptor::query(docs::GET).param("id", ids::to_uuid(id)?);
        self.client
            .execute(request, &ShapeMapping::new().unwrap("source"))
            .await
    }

    /// Remove a log source.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let request = RequestDescriptor::mutation(docs::DELETE).param("id", ids::to_uuid(id)?);
        self.client.send_raw(&request).await?;
        Ok(())
    }
}
