use super::Engine;

use async_trait::async_trait;

use crate::{api::DirectionsAPI, entities::DirectionsResult, error::Error};

#[async_trait]
impl DirectionsAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn get_directions(
        &self,
        origin: String,
        destination: String,
    ) -> Result<DirectionsResult, Error> {
        self.directions.get_directions(&origin, &destination).await
    }
}
