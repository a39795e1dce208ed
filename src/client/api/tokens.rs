//! API tokens

use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::{ApiError, Result};
use crate::normalize::ShapeMapping;
use crate::queries::tokens as docs;

pub struct Tokens<'a> {
    client: &'a Panther,
}

impl<'a> Tokens<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    /// Rotate the token this client authenticates with and switch to the new one.
    ///
    /// Panther may take a few seconds before the new value is accepted.
    pub async fn rotate(&self) -> Result<String> {
        let token = self
            .client
            .execute(
                RequestDescriptor::mutation(docs::ROTATE),
                &ShapeMapping::new().unwrap("rotateAPIToken.token.value"),
            )
            .await?;
        let token = match token {
            Value::String(token) => token,
            other => {
                return Err(ApiError::Decode {
                    reason: "rotateAPIToken returned no token value".to_string(),
                    body: other.to_canonical().to_string(),
                }
                .into());
            }
        };
        self.client.rotate_credential(token.clone()).await;
        Ok(token)
    }
}
