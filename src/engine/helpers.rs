use serde_json::Value;

use crate::{
    db::DocumentStore,
    entities::Driver,
    error::{not_found_error, Error},
};

pub const DRIVERS_COLLECTION: &str = "drivers";

#[tracing::instrument(skip(store))]
pub async fn fetch_driver(store: &dyn DocumentStore, id: &str) -> Result<Driver, Error> {
    let document = store
        .get(DRIVERS_COLLECTION, id)
        .await?
        .ok_or_else(|| not_found_error(format!("driver {}", id)))?;

    Ok(serde_json::from_value(document)?)
}

/// Every readable driver. Documents that no longer parse are logged and
/// left out.
#[tracing::instrument(skip(store))]
pub async fn fetch_drivers(store: &dyn DocumentStore) -> Result<Vec<Driver>, Error> {
    let drivers = store
        .list(DRIVERS_COLLECTION)
        .await?
        .into_iter()
        .filter_map(
            |(key, document)| match serde_json::from_value::<Driver>(document) {
                Ok(driver) => Some(driver),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "skipping malformed driver");
                    None
                }
            },
        )
        .collect();

    Ok(drivers)
}

#[tracing::instrument(skip(store))]
pub async fn update_driver(
    store: &dyn DocumentStore,
    id: &str,
    patch: Value,
) -> Result<Driver, Error> {
    let document = store
        .merge(DRIVERS_COLLECTION, id, patch)
        .await?
        .ok_or_else(|| not_found_error(format!("driver {}", id)))?;

    Ok(serde_json::from_value(document)?)
}
