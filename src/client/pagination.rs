//! Cursor pagination over any transport
//!
//! [`paginate`] turns a request template into a lazy stream of normalized
//! items. Pages are requested one at a time, in order; the stream ends when a
//! page carries no continuation, and ends right after yielding an error if a
//! page fails.

use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use log::debug;
use serde_json::Value as JsonValue;

use super::Transport;
use super::request::RequestDescriptor;
use crate::convert::{ConversionTable, Value};
use crate::error::{Error, Result};
use crate::normalize::ShapeMapping;

/// Page size Panther's REST API accepts for list endpoints.
pub const REST_PAGE_SIZE: usize = 50;

/// Items and continuation pulled out of one raw page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<JsonValue>,
    pub next_cursor: Option<String>,
}

/// How to read items and the next cursor from a raw page, and where the
/// cursor goes in the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageExtractor {
    items_path: Vec<String>,
    /// Sub-path applied to every element of the items array (`node` for connections)
    item_path: Vec<String>,
    cursor_path: Vec<String>,
    has_next_path: Option<Vec<String>>,
    cursor_param: String,
}

fn dotted(path: &str) -> Vec<String> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn lookup<'a>(root: &'a JsonValue, path: &[String]) -> Option<&'a JsonValue> {
    path.iter().try_fold(root, |value, key| value.get(key))
}

impl PageExtractor {
    /// GraphQL connection at `root`: `edges[].node`, `pageInfo.endCursor`,
    /// `pageInfo.hasNextPage`. The cursor is sent as the `cursor` variable.
    pub fn connection(root: &str) -> Self {
        let root_path = dotted(root);
        let at = |suffix: &str| {
            let mut path = root_path.clone();
            path.extend(dotted(suffix));
            path
        };
        Self {
            items_path: at("edges"),
            item_path: vec!["node".to_string()],
            cursor_path: at("pageInfo.endCursor"),
            has_next_path: Some(at("pageInfo.hasNextPage")),
            cursor_param: "cursor".to_string(),
        }
    }

    /// REST list: items under `items_key`, next cursor under `cursor_key`.
    pub fn rest(items_key: &str, cursor_key: &str) -> Self {
        Self {
            items_path: dotted(items_key),
            item_path: Vec::new(),
            cursor_path: dotted(cursor_key),
            has_next_path: None,
            cursor_param: "cursor".to_string(),
        }
    }

    /// Place the cursor at a dotted parameter path instead, e.g. `input.cursor`.
    pub fn cursor_param(mut self, param: &str) -> Self {
        self.cursor_param = param.to_string();
        self
    }

    pub fn cursor_param_path(&self) -> &str {
        &self.cursor_param
    }

    /// Split a raw page. A missing items array is an empty page; a null,
    /// missing or empty cursor, or `hasNextPage: false`, ends pagination.
    pub fn extract(&self, page: &JsonValue) -> Page {
        let items = match lookup(page, &self.items_path) {
            Some(JsonValue::Array(items)) => items
                .iter()
                .map(|item| lookup(item, &self.item_path).cloned().unwrap_or(JsonValue::Null))
                .collect(),
            _ => Vec::new(),
        };

        let has_next = match &self.has_next_path {
            Some(path) => lookup(page, path).and_then(JsonValue::as_bool).unwrap_or(false),
            None => true,
        };

        let next_cursor = match lookup(page, &self.cursor_path) {
            Some(JsonValue::String(cursor)) if has_next && !cursor.is_empty() => {
                Some(cursor.clone())
            }
            _ => None,
        };

        Page { items, next_cursor }
    }
}

enum Cursor {
    First,
    Next(String),
    Done,
}

/// Lazily fetch every page of `template`, yielding normalized items in server order.
///
/// Each call starts from the first page. A failing page surfaces as an `Err`
/// item after everything from earlier pages, and no further requests are made.
pub fn paginate(
    transport: Arc<dyn Transport>,
    template: RequestDescriptor,
    extractor: PageExtractor,
    shape: ShapeMapping,
    conversions: Option<Arc<ConversionTable>>,
) -> BoxStream<'static, Result<Value>> {
    let shape = shape.for_items();
    let ctx = Arc::new((transport, template, extractor, shape, conversions));

    stream::try_unfold((Cursor::First, 0usize), move |(cursor, page_no)| {
        let ctx = ctx.clone();
        async move {
            let (transport, template, extractor, shape, conversions) = &*ctx;
            let request = match cursor {
                Cursor::Done => return Ok::<_, Error>(None),
                Cursor::First => template.clone(),
                Cursor::Next(c) => template.with_cursor(extractor.cursor_param_path(), Some(&c)),
            };

            let raw = transport.send(&request).await?;
            let page = extractor.extract(raw.body());
            debug!(
                "Page {} returned {} items (more: {})",
                page_no,
                page.items.len(),
                page.next_cursor.is_some()
            );

            let items = page
                .items
                .into_iter()
                .map(|item| shape.normalize(item, conversions.as_deref()))
                .collect::<Result<Vec<_>>>()?;

            let next = match page.next_cursor {
                Some(c) => Cursor::Next(c),
                None => Cursor::Done,
            };
            Ok(Some((items, (next, page_no + 1))))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
    .try_flatten()
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::ScriptedTransport;
    use crate::error::ApiError;
    use crate::normalize::{DISCRIMINANT_KEY, UnionSpec};
    use serde_json::json;

    fn rest_page(items: JsonValue, cursor: JsonValue) -> JsonValue {
        json!({"results": items, "next": cursor})
    }

    #[test]
    fn test_extract_connection() {
        let extractor = PageExtractor::connection("alerts");
        let page = extractor.extract(&json!({
            "alerts": {
                "edges": [{"node": {"id": "a"}}, {"node": {"id": "b"}}],
                "pageInfo": {"hasNextPage": true, "endCursor": "c1"}
            }
        }));
        assert_eq!(page.items, vec![json!({"id": "a"}), json!({"id": "b"})]);
        assert_eq!(page.next_cursor.as_deref(), Some("c1"));
    }

    #[test]
    fn test_extract_connection_has_next_false_ends() {
        let extractor = PageExtractor::connection("alerts");
        let page = extractor.extract(&json!({
            "alerts": {"edges": [], "pageInfo": {"hasNextPage": false, "endCursor": "c9"}}
        }));
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn test_extract_rest_sentinels() {
        let extractor = PageExtractor::rest("results", "next");
        for cursor in [JsonValue::Null, json!("")] {
            let page = extractor.extract(&rest_page(json!([1]), cursor));
            assert!(page.next_cursor.is_none());
        }
        let page = extractor.extract(&json!({"next": "c"}));
        assert!(page.items.is_empty());
        assert_eq!(page.next_cursor.as_deref(), Some("c"));
    }

    #[tokio::test]
    async fn test_paginate_concatenates_pages_in_order() {
        let transport = Arc::new(ScriptedTransport::rest(vec![
            rest_page(json!([{"id": 1}, {"id": 2}]), json!("c1")),
            rest_page(json!([{"id": 3}]), JsonValue::Null),
        ]));
        let items: Vec<Value> = paginate(
            transport.clone(),
            RequestDescriptor::get("data_models").param("limit", 50),
            PageExtractor::rest("results", "next"),
            ShapeMapping::new(),
            None,
        )
        .try_collect()
        .await
        .unwrap();

        let ids: Vec<JsonValue> = items.iter().map(|v| v.to_canonical()["id"].clone()).collect();
        assert_eq!(ids, vec![json!(1), json!(2), json!(3)]);

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].parameters().get("cursor").is_none());
        assert_eq!(sent[1].parameters()["cursor"], "c1");
    }

    #[tokio::test]
    async fn test_paginate_n_pages_makes_n_calls() {
        let mut pages: Vec<JsonValue> = (0..4)
            .map(|i| rest_page(json!([i]), json!(format!("c{i}"))))
            .collect();
        pages.push(rest_page(json!([4]), JsonValue::Null));
        let transport = Arc::new(ScriptedTransport::rest(pages));

        let items: Vec<Value> = paginate(
            transport.clone(),
            RequestDescriptor::get("rules"),
            PageExtractor::rest("results", "next"),
            ShapeMapping::new(),
            None,
        )
        .try_collect()
        .await
        .unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(transport.requests().len(), 5);
    }

    #[tokio::test]
    async fn test_paginate_failure_keeps_earlier_items() {
        let transport = Arc::new(ScriptedTransport::new(vec![
            Ok(crate::client::RawResponse::Rest(rest_page(json!(["a", "b"]), json!("c1")))),
            Err(ApiError::Network("connection reset".to_string())),
        ]));
        let mut stream = paginate(
            transport.clone(),
            RequestDescriptor::get("rules"),
            PageExtractor::rest("results", "next"),
            ShapeMapping::new(),
            None,
        );

        assert_eq!(stream.next().await.unwrap().unwrap().as_str(), Some("a"));
        assert_eq!(stream.next().await.unwrap().unwrap().as_str(), Some("b"));
        let err = stream.next().await.unwrap().unwrap_err();
        assert!(matches!(err.api(), Some(ApiError::Network(_))));
        assert!(stream.next().await.is_none());
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_paginate_is_lazy_and_restartable() {
        let page = json!({"cloudAccounts": {
            "edges": [{"node": {"id": "x"}}],
            "pageInfo": {"hasNextPage": false, "endCursor": null}
        }});
        let transport = Arc::new(ScriptedTransport::graphql(vec![page.clone(), page]));
        let make = || {
            paginate(
                transport.clone(),
                RequestDescriptor::query("query { cloudAccounts { edges { node { id } } } }"),
                PageExtractor::connection("cloudAccounts"),
                ShapeMapping::new(),
                None,
            )
        };

        let stream = make();
        assert!(transport.requests().is_empty());
        let first: Vec<Value> = stream.try_collect().await.unwrap();
        let second: Vec<Value> = make().try_collect().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(transport.requests().len(), 2);
        assert!(transport.requests()[1].parameters().get("cursor").is_none());
    }

    #[tokio::test]
    async fn test_paginate_normalizes_each_item() {
        let transport = Arc::new(ScriptedTransport::graphql(vec![json!({"alerts": {
            "edges": [{"node": {"id": "a", "origin": {"__typename": "Detection", "id": "d"}}}],
            "pageInfo": {"hasNextPage": false}
        }})]));
        let items: Vec<Value> = paginate(
            transport,
            RequestDescriptor::query("q"),
            PageExtractor::connection("alerts").cursor_param("input.cursor"),
            // unwrap applies to whole responses, never to extracted items
            ShapeMapping::new()
                .unwrap("alerts")
                .union("origin", UnionSpec::typename(&["Detection", "SystemError"])),
            None,
        )
        .try_collect()
        .await
        .unwrap();

        assert_eq!(
            items[0].pointer(&format!("origin.{DISCRIMINANT_KEY}")).and_then(Value::as_str),
            Some("Detection")
        );
    }

    #[tokio::test]
    async fn test_nested_cursor_param() {
        let transport = Arc::new(ScriptedTransport::graphql(vec![
            json!({"alerts": {"edges": [], "pageInfo": {"hasNextPage": true, "endCursor": "c1"}}}),
            json!({"alerts": {"edges": [], "pageInfo": {"hasNextPage": false}}}),
        ]));
        let _: Vec<Value> = paginate(
            transport.clone(),
            RequestDescriptor::query("q").param("input", json!({"cursor": null})),
            PageExtractor::connection("alerts").cursor_param("input.cursor"),
            ShapeMapping::new(),
            None,
        )
        .try_collect()
        .await
        .unwrap();

        assert_eq!(transport.requests()[1].parameters()["input"]["cursor"], "c1");
    }
}
