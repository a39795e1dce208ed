//! Scripted transport for unit tests
//!
//! Replays queued responses in order and records every request it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::Transport;
use super::request::{RawResponse, RequestDescriptor};
use crate::error::{ApiError, Result};

/// Transport that answers from a script instead of the network.
///
/// # Example
/// ```ignore
/// let transport = ScriptedTransport::graphql(vec![json!({"alert": {"id": "a"}})]);
/// let raw = transport.send(&RequestDescriptor::query("q")).await?;
/// assert_eq!(transport.requests().len(), 1);
/// ```
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<std::result::Result<RawResponse, ApiError>>>,
    captured: Mutex<Vec<RequestDescriptor>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<std::result::Result<RawResponse, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Successful GraphQL `data` payloads, one per call.
    pub fn graphql(pages: Vec<JsonValue>) -> Self {
        Self::new(pages.into_iter().map(|p| Ok(RawResponse::Graphql(p))).collect())
    }

    /// Successful REST bodies, one per call.
    pub fn rest(pages: Vec<JsonValue>) -> Self {
        Self::new(pages.into_iter().map(|p| Ok(RawResponse::Rest(p))).collect())
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.captured.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
        self.captured.lock().unwrap().push(request.clone());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(err)) => Err(err.into()),
            None => Err(ApiError::Network("script exhausted".to_string()).into()),
        }
    }
}
