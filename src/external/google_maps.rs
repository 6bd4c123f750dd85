use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    entities::DirectionsResult,
    error::{
        invalid_input_error, no_route_found_error, upstream_unavailable_error, Error,
    },
    external::polyline,
};

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    async fn get_directions(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<DirectionsResult, Error>;
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextValue {
    pub value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Leg {
    pub distance: TextValue,
    pub duration: TextValue,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OverviewPolyline {
    pub points: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub legs: Vec<Leg>,
    pub overview_polyline: OverviewPolyline,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response {
    status: String,
    #[serde(default)]
    routes: Vec<Route>,
    error_message: Option<String>,
}

/// Google Maps Directions API in driving mode.
#[derive(Clone, Debug)]
pub struct GoogleMaps {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
}

impl GoogleMaps {
    pub fn new(api_base: String, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }
}

#[async_trait]
impl DirectionsProvider for GoogleMaps {
    #[tracing::instrument(skip(self))]
    async fn get_directions(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<DirectionsResult, Error> {
        if origin.trim().is_empty() || destination.trim().is_empty() {
            return Err(invalid_input_error(
                "origin and destination must not be empty",
            ));
        }

        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| upstream_unavailable_error("GOOGLE_MAPS_API_KEY is not configured"))?;

        let url = format!("{}/maps/api/directions/json", self.api_base);

        let res = self
            .client
            .get(url)
            .query(&[("key", key)])
            .query(&[("origin", origin)])
            .query(&[("destination", destination)])
            .query(&[("mode", "driving")])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if status_code >= 400 && status_code < 500 {
            return Err(invalid_input_error("directions request rejected")
                .with_cause(format!("HTTP {}", status_code)));
        } else if status_code != 200 {
            return Err(upstream_unavailable_error("directions service unavailable")
                .with_cause(format!("HTTP {}", status_code)));
        }

        let data: Response = res.json().await?;

        directions_from_response(data)
    }
}

fn directions_from_response(data: Response) -> Result<DirectionsResult, Error> {
    match data.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => return Err(no_route_found_error()),
        "INVALID_REQUEST" => {
            return Err(invalid_input_error("directions request rejected")
                .with_cause(data.error_message.unwrap_or(data.status)))
        }
        _ => {
            tracing::error!(status = %data.status, error = ?data.error_message, "directions request failed");
            return Err(upstream_unavailable_error("directions service unavailable")
                .with_cause(data.error_message.unwrap_or(data.status)));
        }
    }

    let route = data.routes.into_iter().next().ok_or_else(no_route_found_error)?;
    let leg = route.legs.first().ok_or_else(no_route_found_error)?;

    Ok(DirectionsResult {
        distance: (leg.distance.value / 1000.0).round(),
        duration: (leg.duration.value / 60.0).round(),
        route_path: polyline::decode(&route.overview_polyline.points)?,
        summary: route.summary,
    })
}
