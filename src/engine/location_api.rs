use super::helpers::{fetch_driver, update_driver};
use super::prompts;
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::{
    api::LocationAPI,
    auth::{Platform, User},
    entities::{DriverLocationEdit, ResolvedLocation},
    error::{invalid_input_error, location_not_found_error, Error},
    external::generation::generate_validated,
};

const MIN_DESCRIPTION_CHARS: usize = 3;

#[async_trait]
impl LocationAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn resolve_location(&self, description: String) -> Result<ResolvedLocation, Error> {
        let description = description.trim();

        if description.chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(invalid_input_error(format!(
                "location description must be at least {} characters",
                MIN_DESCRIPTION_CHARS
            )));
        }

        let location: ResolvedLocation = generate_validated(
            self.generator.as_ref(),
            prompts::resolve_location(description),
        )
        .await?;

        // (0, 0) is how the generator says it could not place the description
        if location.coordinates().is_zero() {
            return Err(location_not_found_error());
        }

        Ok(location)
    }

    #[tracing::instrument(skip(self))]
    async fn edit_driver_location(
        &self,
        user: User,
        driver_id: String,
        description: String,
    ) -> Result<DriverLocationEdit, Error> {
        self.authorize(user, "edit_driver_location", Platform::default())?;

        fetch_driver(self.store.as_ref(), &driver_id).await?;

        let location = self.resolve_location(description).await?;

        let patch = json!({
            "lastLocation": location.coordinates(),
            "lastSeen": Utc::now(),
        });
        update_driver(self.store.as_ref(), &driver_id, patch).await?;

        tracing::info!(driver = %driver_id, location = %location.description, "driver moved");

        Ok(DriverLocationEdit {
            driver_id,
            location,
        })
    }
}
