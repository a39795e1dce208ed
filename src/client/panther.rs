//! The `Panther` client: one session, one transport, every resource facade

use std::sync::Arc;

use futures::TryStreamExt;
use futures::stream::BoxStream;
use log::{debug, info};

use super::api::{
    Alerts, CloudAccounts, DataModels, Databases, Globals, Metrics, Queries, Roles, Rules, Sources,
    Tokens, Users,
};
use super::http::HttpTransport;
use super::pagination::{PageExtractor, paginate};
use super::request::{RawResponse, RequestDescriptor};
use super::session::{ClientConfig, Session};
use super::Transport;
use crate::convert::{ConversionTable, Value};
use crate::error::Result;
use crate::normalize::ShapeMapping;

/// Client for Panther's public API.
///
/// # Example
/// ```ignore
/// let panther = Panther::new("token", "acme.runpanther.net")?;
/// let alert = panther.alerts().get("7c3a0d4a5e8f4b0c9d1e2f3a4b5c6d7e").await?;
/// ```
#[derive(Clone)]
pub struct Panther {
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    conversions: Arc<ConversionTable>,
}

impl Panther {
    /// Client with default options and conversion disabled.
    pub fn new(credential: impl Into<String>, domain: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(credential, domain))
    }

    /// Client over HTTP with the given options.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let session = Arc::new(Session::new(&config)?);
        let transport = HttpTransport::with_timeout(session.clone(), config.timeout)?;
        debug!("Panther client for {} (conversion: {})", session.domain(), session.conversion_enabled());
        Ok(Self {
            session,
            transport: Arc::new(transport),
            conversions: Arc::new(ConversionTable::panther_defaults()),
        })
    }

    /// Client over a caller-supplied transport.
    pub fn with_transport(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            session: Arc::new(Session::new(config)?),
            transport,
            conversions: Arc::new(ConversionTable::panther_defaults()),
        })
    }

    /// Replace the conversion table used when conversion is enabled.
    pub fn conversion_table(mut self, table: ConversionTable) -> Self {
        self.conversions = Arc::new(table);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn domain(&self) -> &str {
        self.session.domain()
    }

    pub fn conversion_enabled(&self) -> bool {
        self.session.conversion_enabled()
    }

    pub(crate) fn active_conversions(&self) -> Option<Arc<ConversionTable>> {
        self.conversion_enabled().then(|| self.conversions.clone())
    }

    /// Send a descriptor and return the decoded body untouched.
    pub async fn send_raw(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        self.transport.send(request).await
    }

    /// Send a single-object call and normalize its result.
    pub async fn execute(&self, request: RequestDescriptor, shape: &ShapeMapping) -> Result<Value> {
        let raw = self.transport.send(&request).await?;
        shape.normalize(raw.into_body(), self.active_conversions().as_deref())
    }

    /// Lazily page through a list-shaped call.
    pub fn paginate(
        &self,
        template: RequestDescriptor,
        extractor: PageExtractor,
        shape: ShapeMapping,
    ) -> BoxStream<'static, Result<Value>> {
        paginate(
            self.transport.clone(),
            template,
            extractor,
            shape,
            self.active_conversions(),
        )
    }

    /// Every item of a list-shaped call. Fails if any page fails.
    pub async fn collect(
        &self,
        template: RequestDescriptor,
        extractor: PageExtractor,
        shape: ShapeMapping,
    ) -> Result<Vec<Value>> {
        self.paginate(template, extractor, shape).try_collect().await
    }

    /// Install a new credential for every subsequent request.
    pub async fn rotate_credential(&self, credential: impl Into<String>) {
        self.session.rotate(credential).await;
        info!("Credential rotated for {}", self.session.domain());
    }

    pub fn alerts(&self) -> Alerts<'_> {
        Alerts::new(self)
    }

    pub fn cloud_accounts(&self) -> CloudAccounts<'_> {
        CloudAccounts::new(self)
    }

    pub fn queries(&self) -> Queries<'_> {
        Queries::new(self)
    }

    pub fn sources(&self) -> Sources<'_> {
        Sources::new(self)
    }

    pub fn databases(&self) -> Databases<'_> {
        Databases::new(self)
    }

    pub fn metrics(&self) -> Metrics<'_> {
        Metrics::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn roles(&self) -> Roles<'_> {
        Roles::new(self)
    }

    pub fn tokens(&self) -> Tokens<'_> {
        Tokens::new(self)
    }

    pub fn data_models(&self) -> DataModels<'_> {
        DataModels::new(self)
    }

    pub fn rules(&self) -> Rules<'_> {
        Rules::new(self)
    }

    pub fn globals(&self) -> Globals<'_> {
        Globals::new(self)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::graphql_client;
    use super::*;
    use crate::normalize::UnionSpec;
    use serde_json::json;

    #[tokio::test]
    async fn test_execute_respects_conversion_flag() {
        let page = json!({"alert": {"id": "a", "createdAt": "2024-01-02T03:04:05Z"}});
        let shape = ShapeMapping::new().unwrap("alert");

        let (plain, _) = graphql_client(vec![page.clone()], false);
        let value = plain.execute(RequestDescriptor::query("q"), &shape).await.unwrap();
        assert_eq!(value.get("createdAt").and_then(Value::as_str), Some("2024-01-02T03:04:05Z"));

        let (converting, _) = graphql_client(vec![page], true);
        let value = converting.execute(RequestDescriptor::query("q"), &shape).await.unwrap();
        assert!(value.get("createdAt").and_then(Value::as_timestamp).is_some());
    }

    #[tokio::test]
    async fn test_execute_surfaces_normalizer_errors() {
        let (client, _) = graphql_client(vec![json!({"alert": {"origin": {"__typename": "Nope"}}})], false);
        let shape = ShapeMapping::new()
            .unwrap("alert")
            .union("origin", UnionSpec::typename(&["Detection"]));
        assert!(client.execute(RequestDescriptor::query("q"), &shape).await.is_err());
    }

    #[tokio::test]
    async fn test_rotate_credential() {
        let (client, _) = graphql_client(vec![], false);
        client.rotate_credential("fresh").await;
        assert_eq!(&*client.session().credential().await, "fresh");
    }

    #[test]
    fn test_invalid_domain_rejected() {
        assert!(Panther::new("tok", "https://example.panther.com").is_err());
    }
}
