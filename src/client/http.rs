//! HTTP transport dispatcher

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, trace};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, Method};
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};

use super::Transport;
use super::request::{Operation, RawResponse, RequestDescriptor};
use super::session::{DEFAULT_TIMEOUT, Session};
use crate::error::{ApiError, GraphqlError, Result};

/// Header carrying the API token on every request.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Dispatches descriptors to Panther's GraphQL endpoint or REST paths.
pub struct HttpTransport {
    http: HttpClient,
    session: Arc<Session>,
}

impl HttpTransport {
    pub fn new(session: Arc<Session>) -> Result<Self> {
        Self::with_timeout(session, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(session: Arc<Session>, timeout: std::time::Duration) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { http, session })
    }

    async fn send_graphql(&self, document: &str, request: &RequestDescriptor) -> Result<RawResponse> {
        let url = self.session.graphql_url();
        let credential = self.session.credential().await;
        debug!("POST {} ({} variables)", url, request.parameters().len());

        let body = json!({
            "query": document,
            "variables": request.parameters(),
        });
        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &*credential)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(ApiError::from)?;
        trace!("GraphQL response {}: {}", status, text);
        decode_graphql(status, &text).map(RawResponse::Graphql)
    }

    async fn send_rest(&self, method: &Method, path: &str, request: &RequestDescriptor) -> Result<RawResponse> {
        let url = self.session.rest_url(path);
        let credential = self.session.credential().await;
        debug!("{} {}", method, url);

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(API_KEY_HEADER, &*credential)
            .header(CONTENT_TYPE, "application/json");
        let pairs = request.query_pairs();
        if !pairs.is_empty() {
            builder = builder.query(&pairs);
        }
        if !request.params_in_query() {
            builder = builder.json(request.parameters());
        }

        let response = builder.send().await.map_err(ApiError::from)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(ApiError::from)?;
        trace!("REST response {}: {}", status, text);
        decode_rest(status, &text).map(RawResponse::Rest)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        match request.operation() {
            Operation::Graphql { document, .. } => self.send_graphql(document, request).await,
            Operation::Rest { method, path } => self.send_rest(method, path, request).await,
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<JsonValue>,
    #[serde(default)]
    errors: Option<Vec<GraphqlError>>,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Decode a GraphQL envelope. Any reported error fails the call, even when
/// partial data came back with it.
pub(crate) fn decode_graphql(status: u16, text: &str) -> Result<JsonValue> {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) if is_success(status) => {
            return Err(ApiError::Decode {
                reason: e.to_string(),
                body: text.to_string(),
            }
            .into());
        }
        Err(_) => {
            return Err(ApiError::Http {
                status,
                body: text.to_string(),
            }
            .into());
        }
    };

    if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
        return Err(ApiError::Graphql(errors).into());
    }
    if !is_success(status) {
        return Err(ApiError::Http {
            status,
            body: text.to_string(),
        }
        .into());
    }
    Ok(envelope.data.unwrap_or(JsonValue::Null))
}

/// Decode a REST body. An empty 2xx body is `null`.
pub(crate) fn decode_rest(status: u16, text: &str) -> Result<JsonValue> {
    if !is_success(status) {
        return Err(ApiError::Http {
            status,
            body: text.to_string(),
        }
        .into());
    }
    if text.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    serde_json::from_str(text).map_err(|e| {
        ApiError::Decode {
            reason: e.to_string(),
            body: text.to_string(),
        }
        .into()
    })
}
