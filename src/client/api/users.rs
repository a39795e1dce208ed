//! Users

use serde_json::{Map, Value as JsonValue, json};

use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::{ApiError, Result};
use crate::input::{is_email, validate_email};
use crate::normalize::ShapeMapping;
use crate::queries::users as docs;

/// Fields to change on a user. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub role_id: Option<String>,
    pub role_name: Option<String>,
}

impl UserUpdate {
    fn to_input(&self, id: &str) -> Result<Map<String, JsonValue>> {
        if self.role_id.is_some() && self.role_name.is_some() {
            return Err(ApiError::validation("Cannot specify both 'role_id' and 'role_name'.").into());
        }

        let mut input = Map::new();
        input.insert("id".to_string(), JsonValue::from(id));
        if let Some(email) = &self.email {
            input.insert("email".to_string(), JsonValue::from(validate_email(email)?));
        }
        if let Some(given_name) = &self.given_name {
            input.insert("givenName".to_string(), JsonValue::from(given_name.as_str()));
        }
        if let Some(family_name) = &self.family_name {
            input.insert("familyName".to_string(), JsonValue::from(family_name.as_str()));
        }
        if let Some(role_id) = &self.role_id {
            input.insert("role".to_string(), json!({"kind": "ID", "value": role_id}));
        }
        if let Some(role_name) = &self.role_name {
            input.insert("role".to_string(), json!({"kind": "NAME", "value": role_name}));
        }
        Ok(input)
    }
}

pub struct Users<'a> {
    client: &'a Panther,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value> {
        self.client
            .execute(RequestDescriptor::query(docs::LIST), &ShapeMapping::new().unwrap("users"))
            .await
    }

    /// Fetch a user by ID, or by email when `id_or_email` looks like one.
    /// IDs are preferred: emails are not guaranteed unique.
    pub async fn get(&self, id_or_email: &str) -> Result<Value> {
        let (request, root) = if is_email(id_or_email) {
            (
                RequestDescriptor::query(docs::GET_BY_EMAIL).param("email", id_or_email),
                "userByEmail",
            )
        } else {
            (
                RequestDescriptor::query(docs::GET_BY_ID).param("id", id_or_email),
                "userById",
            )
        };
        self.client.execute(request, &ShapeMapping::new().unwrap(root)).await
    }

    pub async fn update(&self, id: &str, changes: &UserUpdate) -> Result<Value> {
        let input = changes.to_input(id)?;
        let request = RequestDescriptor::mutation(docs::UPDATE).param("input", input);
        self.client
            .execute(request, &ShapeMapping::new().unwrap("updateUser.user"))
            .await
    }
}
