//! Roles

use serde_json::{Map, Value as JsonValue};

use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::Result;
use crate::normalize::{ShapeMapping, UnionSpec};
use crate::queries::roles as docs;

pub struct Roles<'a> {
    client: &'a Panther,
}

impl<'a> Roles<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    /// Roles sorted by name, optionally only those whose name contains
    /// `name_contains` (case-insensitive, matched by the server).
    pub async fn list(&self, name_contains: Option<&str>) -> Result<Value> {
        let mut input = Map::new();
        input.insert("sortDir".to_string(), JsonValue::from("ascending"));
        if let Some(fragment) = name_contains {
            input.insert("nameContains".to_string(), JsonValue::from(fragment));
        }

        let shape = ShapeMapping::new()
            .unwrap("roles")
            .union("updatedBy", UnionSpec::typename(&["User", "APIToken"]));
        self.client
            .execute(RequestDescriptor::query(docs::LIST).param("input", input), &shape)
            .await
    }
}
