use super::helpers::{fetch_driver, fetch_drivers, update_driver, DRIVERS_COLLECTION};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, BoxStream, StreamExt};
use rand::Rng;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use crate::{
    api::DriverAPI,
    auth::{Platform, User},
    entities::{Coordinates, Driver, DriverStatus, NewDriver},
    error::{invalid_input_error, invalid_state_error, Error},
};

/// Placeholder avatars are `driver-1` to `driver-{AVATAR_COUNT}`.
const AVATAR_COUNT: u32 = 6;

#[async_trait]
impl DriverAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_driver(&self, user: User, form: NewDriver) -> Result<Driver, Error> {
        self.authorize(user, "create_driver", Platform::default())?;

        form.validate()?;

        let avatar = format!("driver-{}", rand::thread_rng().gen_range(1..=AVATAR_COUNT));
        let driver = Driver::new(form, avatar, Utc::now());

        let created = self
            .store
            .create(DRIVERS_COLLECTION, &driver.id, serde_json::to_value(&driver)?)
            .await?;

        if !created {
            return Err(invalid_state_error(format!(
                "driver {} already exists",
                driver.id
            )));
        }

        tracing::info!(driver = %driver.id, "driver registered");

        Ok(driver)
    }

    #[tracing::instrument(skip(self))]
    async fn find_driver(&self, user: User, id: String) -> Result<Driver, Error> {
        let driver = fetch_driver(self.store.as_ref(), &id).await?;

        self.authorize(user, "read", driver.clone())?;

        Ok(driver)
    }

    #[tracing::instrument(skip(self))]
    async fn list_drivers(&self, user: User) -> Result<Vec<Driver>, Error> {
        self.authorize(user, "list_drivers", Platform::default())?;

        fetch_drivers(self.store.as_ref()).await
    }

    #[tracing::instrument(skip(self))]
    async fn list_active_drivers(&self, user: User) -> Result<Vec<Driver>, Error> {
        self.authorize(user, "list_drivers", Platform::default())?;

        let drivers = fetch_drivers(self.store.as_ref()).await?;

        Ok(drivers.into_iter().filter(Driver::is_online).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn report_location(
        &self,
        user: User,
        id: String,
        coordinates: Coordinates,
    ) -> Result<Driver, Error> {
        coordinates
            .validate("lastLocation")
            .map_err(|err| invalid_input_error(err.cause.unwrap_or(err.message)))?;

        let driver = fetch_driver(self.store.as_ref(), &id).await?;

        self.authorize(user, "report_location", driver)?;

        let patch = json!({
            "lastLocation": coordinates,
            "status": DriverStatus::Online,
            "lastSeen": Utc::now(),
        });

        update_driver(self.store.as_ref(), &id, patch).await
    }

    #[tracing::instrument(skip(self))]
    async fn set_driver_status(
        &self,
        user: User,
        id: String,
        status: DriverStatus,
    ) -> Result<Driver, Error> {
        let driver = fetch_driver(self.store.as_ref(), &id).await?;

        self.authorize(user, "update_status", driver)?;

        update_driver(self.store.as_ref(), &id, json!({ "status": status })).await
    }

    #[tracing::instrument(skip(self))]
    async fn subscribe_drivers(&self, user: User) -> Result<BoxStream<'static, Driver>, Error> {
        self.authorize(user, "subscribe_drivers", Platform::default())?;

        let changes = self.store.subscribe();

        let drivers = stream::unfold(changes, |mut changes| async move {
            loop {
                match changes.recv().await {
                    Ok(change) if change.collection == DRIVERS_COLLECTION => {
                        match serde_json::from_value::<Driver>(change.data) {
                            Ok(driver) => return Some((driver, changes)),
                            Err(err) => {
                                tracing::warn!(key = %change.key, error = %err, "skipping malformed driver")
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "driver subscriber lagged")
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        Ok(drivers.boxed())
    }
}
