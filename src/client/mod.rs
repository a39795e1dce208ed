//! Panther API client
//!
//! Every call flows the same way: a resource facade builds a
//! [`RequestDescriptor`], a [`Transport`] sends it and decodes the envelope,
//! and a [`ShapeMapping`](crate::normalize::ShapeMapping) turns the raw
//! payload into the canonical result.

use async_trait::async_trait;

use crate::error::Result;

pub mod api;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod pagination;
pub mod panther;
pub mod request;
pub mod session;

pub use http::HttpTransport;
pub use pagination::{Page, PageExtractor, REST_PAGE_SIZE, paginate};
pub use panther::Panther;
pub use request::{GraphqlKind, Operation, RawResponse, RequestDescriptor};
pub use session::{ClientConfig, DEFAULT_TIMEOUT, Session};

/// Sends one request and decodes the response envelope.
///
/// Implementations hold no per-call state; one request in, one decoded body
/// or one error out.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse>;
}
