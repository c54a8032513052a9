//! HTTP-backed document store for native builds.
//!
//! Talks to a small REST facade over the real backing store:
//!
//! - `GET  {base}/{collection}/{id}`          -> document
//! - `GET  {base}/{collection}?field=&value=` -> document array
//! - `PUT  {base}/{collection}/{id}`          -> replace
//! - `PATCH {base}/{collection}/{id}`         -> merge fields

use serde::Deserialize;
use serde_json::Value;

use crate::sync::store::{Document, RemoteStore, StoreError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDocument {
    id: String,
    #[serde(default)]
    updated_at: u64,
    #[serde(default)]
    data: Value,
}

impl From<WireDocument> for Document {
    fn from(wire: WireDocument) -> Self {
        Document {
            id: wire.id,
            updated_at: wire.updated_at,
            data: wire.data,
        }
    }
}

pub struct HttpStore {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new()
                .timeout(std::time::Duration::from_secs(10))
                .build(),
        }
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }
}

fn map_error(collection: &str, id: &str, err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(404, _) => StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        },
        other => StoreError::Network(other.to_string()),
    }
}

impl RemoteStore for HttpStore {
    fn get_document(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        let response = self
            .agent
            .get(&self.document_url(collection, id))
            .call()
            .map_err(|e| map_error(collection, id, e))?;
        let wire: WireDocument = response
            .into_json()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(wire.into())
    }

    fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let url = format!("{}/{}", self.base_url, collection);
        let response = self
            .agent
            .get(&url)
            .query("field", field)
            .query("value", value)
            .call()
            .map_err(|e| map_error(collection, "", e))?;
        let wire: Vec<WireDocument> = response
            .into_json()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(wire.into_iter().map(Document::from).collect())
    }

    fn set_document(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.agent
            .put(&self.document_url(collection, id))
            .send_json(&data)
            .map_err(|e| map_error(collection, id, e))?;
        Ok(())
    }

    fn update_document(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        self.agent
            .request("PATCH", &self.document_url(collection, id))
            .send_json(&patch)
            .map_err(|e| map_error(collection, id, e))?;
        Ok(())
    }
}
