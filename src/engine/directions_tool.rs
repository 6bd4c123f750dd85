use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{generation_error, Error},
    external::{generation::Tool, google_maps::DirectionsProvider},
};

#[derive(Debug, Deserialize)]
struct Args {
    origin: String,
    destination: String,
}

/// Exposes real driving directions to the text generator.
pub struct DirectionsTool {
    directions: Arc<dyn DirectionsProvider>,
}

impl DirectionsTool {
    pub fn new(directions: Arc<dyn DirectionsProvider>) -> Self {
        Self { directions }
    }
}

#[async_trait]
impl Tool for DirectionsTool {
    fn name(&self) -> &'static str {
        "getDirections"
    }

    fn description(&self) -> &'static str {
        "Fetches driving directions between two places: distance in km, duration in \
         minutes, the decoded route path and a route summary."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "origin": { "type": "STRING" },
                "destination": { "type": "STRING" },
            },
            "required": ["origin", "destination"],
        })
    }

    #[tracing::instrument(skip(self))]
    async fn call(&self, args: Value) -> Result<Value, Error> {
        let args: Args = serde_json::from_value(args)
            .map_err(|err| generation_error(format!("bad getDirections arguments: {}", err)))?;

        let directions = self
            .directions
            .get_directions(&args.origin, &args.destination)
            .await?;

        Ok(serde_json::to_value(directions)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::google_maps::GoogleMaps;

    #[tokio::test]
    async fn missing_key_is_reported_through_the_tool() {
        let tool = DirectionsTool::new(Arc::new(GoogleMaps::new(
            "https://maps.googleapis.com".into(),
            None,
        )));

        let err = tool
            .call(json!({ "origin": "Patiala", "destination": "Moga" }))
            .await
            .unwrap_err();
        assert!(err.is_upstream_unavailable_error());
    }

    #[tokio::test]
    async fn malformed_arguments_are_a_generation_error() {
        let tool = DirectionsTool::new(Arc::new(GoogleMaps::new(
            "https://maps.googleapis.com".into(),
            None,
        )));

        let err = tool.call(json!({ "from": "Patiala" })).await.unwrap_err();
        assert!(err.is_generation_error());
    }
}
