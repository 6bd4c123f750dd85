use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Coordinates, Validate};
use crate::error::{invalid_input_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteAnalysisRequest {
    pub driver_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub live_location_data: String,
    pub expected_route: String,
}

impl RouteAnalysisRequest {
    pub fn validate(&self) -> Result<(), Error> {
        let required = [
            ("driverId", &self.driver_id),
            ("liveLocationData", &self.live_location_data),
            ("expectedRoute", &self.expected_route),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(invalid_input_error(format!("{} is required", field)));
            }
        }

        if self.start_date > self.end_date {
            return Err(invalid_input_error("startDate must not be after endDate"));
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deviation {
    pub timestamp: String,
    pub latitude: f64,
    pub longitude: f64,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteAnalysis {
    pub deviations: Vec<Deviation>,
    pub summary: String,
}

impl Validate for RouteAnalysis {
    fn validate(&self) -> Result<(), Error> {
        for (i, deviation) in self.deviations.iter().enumerate() {
            Coordinates::new(deviation.latitude, deviation.longitude)
                .validate(&format!("deviations[{}]", i))?;
        }

        Ok(())
    }
}
