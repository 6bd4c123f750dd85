use super::directions_tool::DirectionsTool;
use super::prompts::{self, PATH_TARGET, STOP_TARGET};
use super::Engine;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    api::RouteAPI,
    config::RouteGrounding,
    entities::TripEstimate,
    error::{invalid_input_error, Error},
    external::generation::generate_validated,
};

#[async_trait]
impl RouteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn estimate_route(
        &self,
        origin: String,
        destination: String,
    ) -> Result<TripEstimate, Error> {
        let origin = origin.trim();
        let destination = destination.trim();

        if origin.is_empty() {
            return Err(invalid_input_error("origin is required"));
        }

        if destination.is_empty() {
            return Err(invalid_input_error("destination is required"));
        }

        if let Some(mut estimate) = self.routes.get(origin, destination).await? {
            tracing::debug!("route cache hit");
            estimate.origin = origin.into();
            estimate.destination = destination.into();
            return Ok(estimate);
        }

        let request = match self.grounding {
            RouteGrounding::Knowledge => prompts::knowledge_route(origin, destination),
            RouteGrounding::Directions => prompts::grounded_route(origin, destination)
                .with_tool(Arc::new(DirectionsTool::new(self.directions.clone()))),
        };

        let mut estimate: TripEstimate =
            generate_validated(self.generator.as_ref(), request).await?;

        estimate.origin = origin.into();
        estimate.destination = destination.into();

        let supplied = estimate.avg_speed_kmph;
        if estimate.reconcile_avg_speed() {
            tracing::warn!(
                supplied,
                derived = estimate.avg_speed_kmph,
                "generated average speed disagrees with distance and eta"
            );
        }

        if !STOP_TARGET.contains(&estimate.bus_stops.len())
            || !PATH_TARGET.contains(&estimate.route_path.len())
        {
            tracing::debug!(
                stops = estimate.bus_stops.len(),
                points = estimate.route_path.len(),
                "estimate outside requested cardinality"
            );
        }

        if let Err(err) = self.routes.put(origin, destination, &estimate).await {
            tracing::warn!(error = %err, cause = ?err.cause, "failed to cache route estimate");
        }

        Ok(estimate)
    }
}
