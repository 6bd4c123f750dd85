use std::sync::Arc;

use crate::{
    db::DocumentStore,
    entities::TripEstimate,
    error::Error,
    external::generation::parse_validated,
};

pub const ROUTE_CACHE_COLLECTION: &str = "routeCache";

/// `route:{origin}-to-{destination}` with both names trimmed, lowercased
/// and inner whitespace runs replaced by `_`. Direction matters.
pub fn cache_key(origin: &str, destination: &str) -> String {
    format!("route:{}-to-{}", normalize(origin), normalize(destination))
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Generated estimates, one document per cache key. Entries never expire.
#[derive(Clone)]
pub struct RouteCache {
    store: Arc<dyn DocumentStore>,
}

impl RouteCache {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// A stored value that no longer validates fails the read.
    #[tracing::instrument(skip(self))]
    pub async fn get(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Option<TripEstimate>, Error> {
        let key = cache_key(origin, destination);

        match self.store.get(ROUTE_CACHE_COLLECTION, &key).await? {
            Some(document) => parse_validated(ROUTE_CACHE_COLLECTION, document).map(Some),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self, estimate))]
    pub async fn put(
        &self,
        origin: &str,
        destination: &str,
        estimate: &TripEstimate,
    ) -> Result<(), Error> {
        let key = cache_key(origin, destination);

        self.store
            .set(ROUTE_CACHE_COLLECTION, &key, serde_json::to_value(estimate)?)
            .await
    }
}
