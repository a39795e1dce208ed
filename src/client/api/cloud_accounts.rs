//! Cloud accounts

use futures::stream::BoxStream;

use crate::client::pagination::PageExtractor;
use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::Result;
use crate::input::ids;
use crate::normalize::ShapeMapping;
use crate::queries::cloud_accounts as docs;

pub struct CloudAccounts<'a> {
    client: &'a Panther,
}

impl<'a> CloudAccounts<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    pub fn list(&self) -> BoxStream<'static, Result<Value>> {
        self.client.paginate(
            RequestDescriptor::query(docs::LIST),
            PageExtractor::connection("cloudAccounts"),
            ShapeMapping::new(),
        )
    }

    /// One account. Cloud account IDs are sent in dashed form.
    pub async fn get(&self, id: &str) -> Result<Value> {
        let request = RequestDescriptor::query(docs::GET).param("id", ids::to_uuid(id)?);
        self.client
            .execute(request, &ShapeMapping::new().unwrap("cloudAccount"))
            .await
    }
}
