use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Driving directions between two places, as returned to the generator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsResult {
    /// Kilometers, rounded.
    pub distance: f64,
    /// Minutes, rounded.
    pub duration: f64,
    pub route_path: Vec<Coordinates>,
    pub summary: String,
}
