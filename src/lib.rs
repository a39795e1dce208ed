//! Client for Panther's public API
//!
//! [`Panther`] hides Panther's GraphQL endpoint and REST endpoints behind one
//! calling convention. Resource facades ([`Panther::alerts`],
//! [`Panther::users`], ...) build request descriptors; the core dispatches
//! them, pages through list results, and normalizes payloads into canonical
//! values. With conversion enabled, timestamp leaves come back as
//! [`convert::Timestamp`]s.
//!
//! # Example
//! ```ignore
//! use futures::TryStreamExt;
//! use panther_seim::{ClientConfig, Panther};
//!
//! let panther = Panther::with_config(
//!     ClientConfig::new(token, "acme.runpanther.net").conversion(true),
//! )?;
//! let alerts: Vec<_> = panther
//!     .alerts()
//!     .list("2024-01-01T00:00:00Z", chrono::Utc::now())?
//!     .try_collect()
//!     .await?;
//! ```

pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod input;
pub mod normalize;
pub mod queries;

pub use client::api;
pub use client::{
    ClientConfig, HttpTransport, Operation, PageExtractor, Panther, RawResponse,
    RequestDescriptor, Session, Transport,
};
pub use convert::{ConversionTable, Value};
pub use error::{ApiError, Error, GraphqlFailure, Result};
pub use normalize::{DISCRIMINANT_KEY, ShapeMapping, UnionSpec};
