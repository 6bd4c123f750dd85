use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{broadcast, RwLock};

use super::{merge_objects, DocumentChange, DocumentStore, CHANGE_CHANNEL_CAPACITY};
use crate::error::Error;

type Collection = BTreeMap<String, Value>;

/// Process-local store. Backs tests and database-less runs.
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    changes: broadcast::Sender<DocumentChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Self {
            collections: RwLock::new(HashMap::new()),
            changes,
        }
    }

    fn notify(&self, collection: &str, key: &str, data: &Value) {
        // no receivers is fine
        let _ = self.changes.send(DocumentChange {
            collection: collection.into(),
            key: key.into(),
            data: data.clone(),
        });
    }

    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, Error> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    async fn set(&self, collection: &str, key: &str, data: Value) -> Result<(), Error> {
        self.collections
            .write()
            .await
            .entry(collection.into())
            .or_default()
            .insert(key.into(), data.clone());

        self.notify(collection, key, &data);

        Ok(())
    }

    async fn create(&self, collection: &str, key: &str, data: Value) -> Result<bool, Error> {
        {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection.into()).or_default();

            if docs.contains_key(key) {
                return Ok(false);
            }

            docs.insert(key.into(), data.clone());
        }

        self.notify(collection, key, &data);

        Ok(true)
    }

    async fn merge(
        &self,
        collection: &str,
        key: &str,
        patch: Value,
    ) -> Result<Option<Value>, Error> {
        let merged = {
            let mut collections = self.collections.write().await;

            match collections
                .get_mut(collection)
                .and_then(|docs| docs.get_mut(key))
            {
                Some(doc) => {
                    merge_objects(doc, patch);
                    doc.clone()
                }
                None => return Ok(None),
            }
        };

        self.notify(collection, key, &merged);

        Ok(Some(merged))
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>, Error> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(key, data)| (key.clone(), data.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn subscribe(&self) -> broadcast::Receiver<DocumentChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryStore::new();
        assert_ok!(store.set("routeCache", "a", json!({ "x": 1 })).await);

        assert_eq!(
            store.get("routeCache", "a").await.unwrap(),
            Some(json!({ "x": 1 }))
        );
        assert_eq!(store.get("routeCache", "b").await.unwrap(), None);
        assert_eq!(store.get("drivers", "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn create_refuses_existing_keys() {
        let store = MemoryStore::new();

        assert!(store.create("drivers", "DRI-001", json!({})).await.unwrap());
        assert!(!store.create("drivers", "DRI-001", json!({ "y": 2 })).await.unwrap());
        assert_eq!(
            store.get("drivers", "DRI-001").await.unwrap(),
            Some(json!({}))
        );
    }

    #[tokio::test]
    async fn merge_requires_an_existing_document() {
        let store = MemoryStore::new();
        assert_eq!(
            store.merge("drivers", "nobody", json!({ "a": 1 })).await.unwrap(),
            None
        );

        store.set("drivers", "d", json!({ "a": 1, "b": 2 })).await.unwrap();
        let merged = store.merge("drivers", "d", json!({ "b": 3 })).await.unwrap();
        assert_eq!(merged, Some(json!({ "a": 1, "b": 3 })));
    }

    #[tokio::test]
    async fn subscribers_see_writes() {
        let store = MemoryStore::new();
        let mut changes = store.subscribe();

        store.set("drivers", "d", json!({ "status": "online" })).await.unwrap();

        let change = changes.recv().await.unwrap();
        assert_eq!(change.collection, "drivers");
        assert_eq!(change.key, "d");
        assert_eq!(change.data, json!({ "status": "online" }));

        drop(store);
        assert_err!(changes.recv().await);
    }

    #[tokio::test]
    async fn list_is_ordered_by_key() {
        let store = MemoryStore::new();
        store.set("drivers", "b", json!(2)).await.unwrap();
        store.set("drivers", "a", json!(1)).await.unwrap();

        let keys: Vec<String> = store
            .list("drivers")
            .await
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
