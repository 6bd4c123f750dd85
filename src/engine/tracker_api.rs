use super::helpers::fetch_drivers;
use super::Engine;

use async_trait::async_trait;
use futures::future::join_all;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::{
    api::{RouteAPI, TrackerAPI},
    entities::{Driver, LiveRoute},
    error::Error,
};

pub const PUNJAB_CITIES: [&str; 16] = [
    "Amritsar",
    "Barnala",
    "Bathinda",
    "Chandigarh",
    "Faridkot",
    "Firozpur",
    "Hoshiarpur",
    "Jalandhar",
    "Kapurthala",
    "Ludhiana",
    "Moga",
    "Mohali",
    "Pathankot",
    "Patiala",
    "Rupnagar",
    "Sangrur",
];

/// Two distinct cities, in travel order.
fn pick_trip<R: Rng>(rng: &mut R) -> (&'static str, &'static str) {
    let picked: Vec<&'static str> = PUNJAB_CITIES.choose_multiple(rng, 2).copied().collect();

    (picked[0], picked[1])
}

#[async_trait]
impl TrackerAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn live_routes(
        &self,
        from: Option<String>,
        to: Option<String>,
    ) -> Result<Vec<LiveRoute>, Error> {
        let drivers = fetch_drivers(self.store.as_ref()).await?;

        let trips: Vec<(Driver, &str, &str)> = {
            let mut rng = rand::thread_rng();

            drivers
                .into_iter()
                .filter(Driver::is_online)
                .map(|driver| {
                    let (origin, destination) = pick_trip(&mut rng);
                    (driver, origin, destination)
                })
                .collect()
        };

        let routes = join_all(trips.into_iter().map(|(mut driver, origin, destination)| async move {
            match self.estimate_route(origin.into(), destination.into()).await {
                Ok(mut route) => {
                    route.route_summary = format!("{} to {}", origin, destination);
                    if let Some(position) = route.live_position() {
                        driver.last_location = position;
                    }

                    Some(LiveRoute { driver, route })
                }
                Err(err) => {
                    tracing::warn!(driver = %driver.id, error = %err, "dropping driver without a route");
                    None
                }
            }
        }))
        .await;

        Ok(routes
            .into_iter()
            .flatten()
            .filter(|live| live.matches(from.as_deref(), to.as_deref()))
            .collect())
    }
}
