//! Request descriptors and raw responses

use reqwest::Method;
use serde_json::{Map, Value as JsonValue};

/// GraphQL operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphqlKind {
    Query,
    Mutation,
}

/// Which transport a request goes through.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// A document sent to the GraphQL endpoint.
    Graphql {
        kind: GraphqlKind,
        document: &'static str,
    },
    /// A REST verb against a path under the domain.
    Rest { method: Method, path: String },
}

/// Description of one API call.
///
/// Built fresh by a resource facade, then handed to a [`Transport`](super::Transport).
/// Parameters keep insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    operation: Operation,
    params: Map<String, JsonValue>,
    query: Map<String, JsonValue>,
}

impl RequestDescriptor {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            params: Map::new(),
            query: Map::new(),
        }
    }

    pub fn query(document: &'static str) -> Self {
        Self::new(Operation::Graphql {
            kind: GraphqlKind::Query,
            document,
        })
    }

    pub fn mutation(document: &'static str) -> Self {
        Self::new(Operation::Graphql {
            kind: GraphqlKind::Mutation,
            document,
        })
    }

    pub fn rest(method: Method, path: impl Into<String>) -> Self {
        Self::new(Operation::Rest {
            method,
            path: path.into(),
        })
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::rest(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::rest(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::rest(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::rest(Method::DELETE, path)
    }

    /// Add one parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add every entry of `params`, in order.
    pub fn params(mut self, params: Map<String, JsonValue>) -> Self {
        self.params.extend(params);
        self
    }

    /// Add a query-string parameter. On POST and PUT this rides next to the
    /// JSON body; on GET and DELETE it follows the ordinary parameters.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn parameters(&self) -> &Map<String, JsonValue> {
        &self.params
    }

    pub fn is_graphql(&self) -> bool {
        matches!(self.operation, Operation::Graphql { .. })
    }

    /// Copy of this descriptor with `cursor` placed at the dotted parameter path.
    ///
    /// `None` leaves the parameters untouched. Intermediate objects are created
    /// as needed, for example `input.cursor`.
    pub fn with_cursor(&self, cursor_path: &str, cursor: Option<&str>) -> Self {
        let mut next = self.clone();
        let Some(cursor) = cursor else {
            return next;
        };

        let path: Vec<&str> = cursor_path.split('.').collect();
        set_path(&mut next.params, &path, JsonValue::String(cursor.to_string()));
        next
    }

    /// Whether the parameters travel in the query string rather than a body.
    pub fn params_in_query(&self) -> bool {
        match &self.operation {
            Operation::Rest { method, .. } => *method == Method::GET || *method == Method::DELETE,
            Operation::Graphql { .. } => false,
        }
    }

    /// Everything sent in the query string, rendered as pairs. Nulls are
    /// skipped, strings are sent as-is, everything else as its JSON text.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let params = self.params_in_query().then_some(&self.params);
        params
            .into_iter()
            .flatten()
            .chain(&self.query)
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| {
                let rendered = match v {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), rendered)
            })
            .collect()
    }
}

fn set_path(map: &mut Map<String, JsonValue>, path: &[&str], value: JsonValue) {
    match path {
        [] => {}
        [last] => {
            map.insert(last.to_string(), value);
        }
        [head, rest @ ..] => {
            let slot = map
                .entry(head.to_string())
                .or_insert_with(|| JsonValue::Object(Map::new()));
            if !slot.is_object() {
                *slot = JsonValue::Object(Map::new());
            }
            if let JsonValue::Object(inner) = slot {
                set_path(inner, rest, value);
            }
        }
    }
}

/// Decoded but not yet normalized response body.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    /// The `data` member of a GraphQL envelope with no errors.
    Graphql(JsonValue),
    /// A REST JSON body. Empty bodies decode to `null`.
    Rest(JsonValue),
}

impl RawResponse {
    pub fn into_body(self) -> JsonValue {
        match self {
            RawResponse::Graphql(body) | RawResponse::Rest(body) => body,
        }
    }

    pub fn body(&self) -> &JsonValue {
        match self {
            RawResponse::Graphql(body) | RawResponse::Rest(body) => body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_keep_insertion_order() {
        let req = RequestDescriptor::get("rules")
            .param("zeta", 1)
            .param("alpha", 2);
        let keys: Vec<&String> = req.parameters().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_with_cursor_nested_path() {
        let template = RequestDescriptor::query("query { x }")
            .param("input", json!({"createdAtAfter": "a", "cursor": null}));
        let next = template.with_cursor("input.cursor", Some("c1"));

        assert_eq!(
            next.parameters()["input"],
            json!({"createdAtAfter": "a", "cursor": "c1"})
        );
        // the template itself is untouched
        assert_eq!(template.parameters()["input"]["cursor"], JsonValue::Null);
    }

    #[test]
    fn test_with_cursor_creates_parents() {
        let next = RequestDescriptor::query("q").with_cursor("input.cursor", Some("c1"));
        assert_eq!(next.parameters()["input"], json!({"cursor": "c1"}));
    }

    #[test]
    fn test_with_cursor_none_is_identity() {
        let template = RequestDescriptor::get("data_models").param("limit", 50);
        assert_eq!(template.with_cursor("cursor", None), template);
    }

    #[test]
    fn test_query_pairs_rendering() {
        let req = RequestDescriptor::get("data_models")
            .param("limit", 50)
            .param("cursor", "abc")
            .param("skip", JsonValue::Null)
            .param("enabled", true);
        assert_eq!(
            req.query_pairs(),
            vec![
                ("limit".to_string(), "50".to_string()),
                ("cursor".to_string(), "abc".to_string()),
                ("enabled".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_pairs_on_body_verbs() {
        let req = RequestDescriptor::post("rules")
            .param("id", "Rule.A")
            .query_param("run-tests-only", true)
            .query_param("run-tests-first", JsonValue::Null);
        assert!(!req.params_in_query());
        assert_eq!(
            req.query_pairs(),
            vec![("run-tests-only".to_string(), "true".to_string())]
        );

        let req = RequestDescriptor::delete("rules/Rule.A")
            .param("force", true)
            .query_param("dry", false);
        assert_eq!(
            req.query_pairs(),
            vec![
                ("force".to_string(), "true".to_string()),
                ("dry".to_string(), "false".to_string()),
            ]
        );
    }
}
