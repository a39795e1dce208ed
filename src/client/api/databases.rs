//! Datalake databases

use crate::client::panther::Panther;
use crate::client::request::RequestDescriptor;
use crate::convert::Value;
use crate::error::Result;
use crate::input::validate_identifier;
use crate::normalize::ShapeMapping;
use crate::queries::databases as docs;

pub struct Databases<'a> {
    client: &'a Panther,
}

impl<'a> Databases<'a> {
    pub(crate) fn new(client: &'a Panther) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Value> {
        self.client
            .execute(
                RequestDescriptor::query(docs::LIST),
                &ShapeMapping::new().unwrap("dataLakeDatabases"),
            )
            .await
    }

    /// A database with its tables and columns.
    pub async fn get(&self, name: &str) -> Result<Value> {
        let request =
            RequestDescriptor::query(docs::GET).param("database", validate_identifier(name)?);
        self.client
            .execute(request, &ShapeMapping::new().unwrap("dataLakeDatabase"))
            .await
    }
}
