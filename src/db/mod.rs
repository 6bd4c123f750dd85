mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::Error;

/// Capacity of the change channel handed to subscribers.
pub const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentChange {
    pub collection: String,
    pub key: String,
    pub data: Value,
}

/// Key-value document store with per-collection change notification.
///
/// Single-document writes are atomic. Nothing spans documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, Error>;

    /// Creates or replaces a document.
    async fn set(&self, collection: &str, key: &str, data: Value) -> Result<(), Error>;

    /// Creates a document, returning false when the key is already taken.
    async fn create(&self, collection: &str, key: &str, data: Value) -> Result<bool, Error>;

    /// Shallow-merges `patch` into an existing document and returns the
    /// merged document, or `None` when there is no such document.
    async fn merge(
        &self,
        collection: &str,
        key: &str,
        patch: Value,
    ) -> Result<Option<Value>, Error>;

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, Error>;

    /// Changes to every collection; callers filter on `collection`.
    fn subscribe(&self) -> broadcast::Receiver<DocumentChange>;
}

/// Applies `patch` over `document` key by key.
pub(crate) fn merge_objects(document: &mut Value, patch: Value) {
    match (document.as_object_mut(), patch) {
        (Some(target), Value::Object(fields)) => {
            for (field, value) in fields {
                target.insert(field, value);
            }
        }
        (_, patch) => *document = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overwrites_top_level_fields_only() {
        let mut doc = json!({ "name": "Alex", "lastLocation": { "lat": 1.0, "lng": 2.0 } });
        merge_objects(&mut doc, json!({ "lastLocation": { "lat": 3.0 } }));

        assert_eq!(
            doc,
            json!({ "name": "Alex", "lastLocation": { "lat": 3.0 } })
        );
    }
}
