//! Response normalization
//!
//! A [`ShapeMapping`] describes, for one call, where the result lives in the
//! raw payload, which fields are polymorphic unions, and which fields are
//! renamed. [`ShapeMapping::canonicalize`] applies it and yields a canonical
//! `serde_json::Value`; [`ShapeMapping::normalize`] additionally runs the
//! value converter over the result when a conversion table is supplied.

use std::collections::HashMap;

use serde_json::{Map, Value as JsonValue};

use crate::convert::{ConversionTable, Value};
use crate::error::{ApiError, Result};

/// Reserved field carrying the variant name of a resolved union object.
pub const DISCRIMINANT_KEY: &str = "__kind";

/// Discriminant key GraphQL uses on the wire.
pub const GRAPHQL_TYPENAME: &str = "__typename";

/// A polymorphic field and the variants it may hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionSpec {
    /// Key holding the variant name in the raw object
    pub wire_key: String,
    /// Every variant the server may return
    pub variants: Vec<String>,
}

impl UnionSpec {
    /// Union discriminated by GraphQL's `__typename`.
    pub fn typename(variants: &[&str]) -> Self {
        Self {
            wire_key: GRAPHQL_TYPENAME.to_string(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Declarative description of how to turn a raw payload into canonical form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeMapping {
    unwrap: Vec<String>,
    unions: HashMap<String, UnionSpec>,
    renames: HashMap<String, String>,
}

impl ShapeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend through `path` (dotted) before normalizing, e.g. `alert` to
    /// unwrap `data.alert`.
    pub fn unwrap(mut self, path: &str) -> Self {
        self.unwrap = path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Declare `field` as a union, wherever it appears.
    pub fn union(mut self, field: impl Into<String>, spec: UnionSpec) -> Self {
        self.unions.insert(field.into(), spec);
        self
    }

    /// Rename the wire field `from` to the canonical name `to`, wherever it appears.
    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    /// Same mapping without the unwrap step, for items already extracted from a page.
    pub fn for_items(&self) -> Self {
        Self {
            unwrap: Vec::new(),
            ..self.clone()
        }
    }

    /// Unwrap, resolve unions and rename. Missing unwrap targets yield `null`.
    pub fn canonicalize(&self, raw: JsonValue) -> Result<JsonValue> {
        let mut current = raw;
        for segment in &self.unwrap {
            current = match current {
                JsonValue::Object(mut map) => map.remove(segment).unwrap_or(JsonValue::Null),
                _ => JsonValue::Null,
            };
        }
        self.walk(current)
    }

    /// Canonicalize, then convert leaves when `conversions` is given.
    pub fn normalize(&self, raw: JsonValue, conversions: Option<&ConversionTable>) -> Result<Value> {
        let canonical = self.canonicalize(raw)?;
        Ok(match conversions {
            Some(table) => Value::convert(canonical, table),
            None => Value::from(canonical),
        })
    }

    fn walk(&self, raw: JsonValue) -> Result<JsonValue> {
        match raw {
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| self.walk(item))
                .collect::<Result<Vec<_>>>()
                .map(JsonValue::Array),
            JsonValue::Object(map) => self.walk_object(map).map(JsonValue::Object),
            scalar => Ok(scalar),
        }
    }

    fn walk_object(&self, map: Map<String, JsonValue>) -> Result<Map<String, JsonValue>> {
        let mut out = Map::new();
        for (key, value) in map {
            let value = match self.unions.get(&key) {
                Some(spec) => self.resolve_union(&key, spec, value)?,
                None => self.walk(value)?,
            };
            let key = self.renames.get(&key).cloned().unwrap_or(key);
            out.insert(key, value);
        }
        Ok(out)
    }

    fn resolve_union(&self, field: &str, spec: &UnionSpec, value: JsonValue) -> Result<JsonValue> {
        match value {
            JsonValue::Null => Ok(JsonValue::Null),
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| self.resolve_union(field, spec, item))
                .collect::<Result<Vec<_>>>()
                .map(JsonValue::Array),
            JsonValue::Object(mut map) => {
                let variant = match map.remove(&spec.wire_key) {
                    Some(JsonValue::String(name)) if spec.variants.contains(&name) => name,
                    Some(other) => {
                        return Err(union_error(field, "unknown variant", &other));
                    }
                    None => {
                        return Err(union_error(
                            field,
                            &format!("missing discriminant '{}'", spec.wire_key),
                            &JsonValue::Object(map),
                        ));
                    }
                };
                // a variant object may itself hold unions or renamed fields
                let rest = self.walk_object(map)?;
                let mut tagged = Map::new();
                tagged.insert(DISCRIMINANT_KEY.to_string(), JsonValue::String(variant));
                tagged.extend(rest);
                Ok(JsonValue::Object(tagged))
            }
            other => Err(union_error(field, "expected an object", &other)),
        }
    }
}

fn union_error(field: &str, reason: &str, body: &JsonValue) -> crate::error::Error {
    ApiError::Decode {
        reason: format!("union field '{field}': {reason}"),
        body: body.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alert_shape() -> ShapeMapping {
        ShapeMapping::new()
            .unwrap("alert")
            .union("origin", UnionSpec::typename(&["Detection", "SystemError"]))
            .union("updatedBy", UnionSpec::typename(&["User", "APIToken"]))
    }

    /// Every object under a union field carries the discriminant.
    fn assert_tagged(value: &JsonValue, union_fields: &[&str]) {
        match value {
            JsonValue::Object(map) => {
                for (k, v) in map {
                    if union_fields.contains(&k.as_str()) {
                        if let JsonValue::Object(inner) = v {
                            assert!(inner.contains_key(DISCRIMINANT_KEY), "{k} untagged");
                        }
                    }
                    assert_tagged(v, union_fields);
                }
            }
            JsonValue::Array(items) => items.iter().for_each(|i| assert_tagged(i, union_fields)),
            _ => {}
        }
    }

    #[test]
    fn test_union_is_tagged() {
        let raw = json!({"alert": {"id": "alert-1", "origin": {"__typename": "Detection", "id": "d1"}}});
        let out = alert_shape().canonicalize(raw).unwrap();

        assert_eq!(out["origin"][DISCRIMINANT_KEY], "Detection");
        assert_eq!(out["origin"]["id"], "d1");
        assert!(out["origin"].get(GRAPHQL_TYPENAME).is_none());
        assert_tagged(&out, &["origin", "updatedBy"]);
    }

    #[test]
    fn test_union_inside_lists() {
        let shape = ShapeMapping::new()
            .union("origin", UnionSpec::typename(&["Detection", "SystemError"]));
        let raw = json!([
            {"origin": {"__typename": "Detection", "id": "d1"}},
            {"origin": {"__typename": "SystemError", "type": "S3"}},
            {"origin": null}
        ]);
        let out = shape.canonicalize(raw).unwrap();

        assert_eq!(out[1]["origin"][DISCRIMINANT_KEY], "SystemError");
        assert!(out[2]["origin"].is_null());
        assert_tagged(&out, &["origin"]);
    }

    #[test]
    fn test_unknown_variant_is_decode_error() {
        let raw = json!({"alert": {"origin": {"__typename": "Mystery"}}});
        let err = alert_shape().canonicalize(raw).unwrap_err();
        assert!(matches!(err.api(), Some(ApiError::Decode { .. })));
    }

    #[test]
    fn test_missing_discriminant_is_decode_error() {
        let raw = json!({"alert": {"origin": {"id": "d1"}}});
        assert!(alert_shape().canonicalize(raw).is_err());
    }

    #[test]
    fn test_missing_optional_fields_are_tolerated() {
        let out = alert_shape().canonicalize(json!({"alert": {"id": "a"}})).unwrap();
        assert_eq!(out, json!({"id": "a"}));

        let out = alert_shape().canonicalize(json!({"alert": null})).unwrap();
        assert!(out.is_null());

        let out = alert_shape().canonicalize(json!({})).unwrap();
        assert!(out.is_null());
    }

    #[test]
    fn test_rename_keeps_position() {
        let shape = ShapeMapping::new().rename("logTypes", "log_types");
        let out = shape
            .canonicalize(json!({"id": "m", "logTypes": ["AWS.CloudTrail"], "enabled": true}))
            .unwrap();
        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["id", "log_types", "enabled"]);
    }

    #[test]
    fn test_nested_union_in_variant() {
        let shape = ShapeMapping::new()
            .union("origin", UnionSpec::typename(&["Detection"]))
            .union("owner", UnionSpec::typename(&["User", "APIToken"]));
        let raw = json!({"origin": {"__typename": "Detection", "owner": {"__typename": "User", "id": "u"}}});
        let out = shape.canonicalize(raw).unwrap();
        assert_eq!(out["origin"]["owner"][DISCRIMINANT_KEY], "User");
    }

    #[test]
    fn test_custom_wire_key() {
        let spec = UnionSpec {
            wire_key: "type".to_string(),
            variants: vec!["s3".to_string(), "sqs".to_string()],
        };
        let shape = ShapeMapping::new().union("integration", spec);
        let out = shape
            .canonicalize(json!({"integration": {"type": "sqs", "queue": "q"}}))
            .unwrap();
        assert_eq!(out["integration"], json!({"__kind": "sqs", "queue": "q"}));
    }

    #[test]
    fn test_normalize_with_and_without_conversion() {
        let raw = json!({"alert": {"id": "a", "createdAt": "2024-05-01T10:00:00.123Z"}});
        let table = ConversionTable::panther_defaults();

        let plain = alert_shape().normalize(raw.clone(), None).unwrap();
        let converted = alert_shape().normalize(raw, Some(&table)).unwrap();

        assert!(matches!(plain.get("createdAt"), Some(Value::String(_))));
        assert!(converted.get("createdAt").unwrap().as_timestamp().is_some());
        assert_eq!(plain.to_canonical(), converted.to_canonical());
    }
}
