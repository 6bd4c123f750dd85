use serde::{Deserialize, Serialize};

use super::{Coordinates, Validate};
use crate::error::{schema_validation_error, Error};

/// Relative tolerance between the supplied and the derived average speed.
const AVG_SPEED_TOLERANCE: f64 = 0.1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BusStop {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl BusStop {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Generated estimate for a trip between two named places.
///
/// `origin` and `destination` are absent from generator output and are
/// filled in by the estimator before the value is cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripEstimate {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    pub eta_minutes: f64,
    pub distance_km: f64,
    pub route_summary: String,
    pub avg_speed_kmph: f64,
    pub bus_stops: Vec<BusStop>,
    pub route_path: Vec<Coordinates>,
}

impl Validate for TripEstimate {
    fn validate(&self) -> Result<(), Error> {
        if !(self.eta_minutes.is_finite() && self.eta_minutes > 0.0) {
            return Err(schema_validation_error(format!(
                "etaMinutes must be positive, got {}",
                self.eta_minutes
            )));
        }

        if !(self.distance_km.is_finite() && self.distance_km > 0.0) {
            return Err(schema_validation_error(format!(
                "distanceKm must be positive, got {}",
                self.distance_km
            )));
        }

        if !(self.avg_speed_kmph.is_finite() && self.avg_speed_kmph > 0.0) {
            return Err(schema_validation_error(format!(
                "avgSpeedKmph must be positive, got {}",
                self.avg_speed_kmph
            )));
        }

        if self.bus_stops.is_empty() {
            return Err(schema_validation_error("busStops must not be empty"));
        }

        for (i, stop) in self.bus_stops.iter().enumerate() {
            stop.coordinates().validate(&format!("busStops[{}]", i))?;
        }

        if self.route_path.len() < 2 {
            return Err(schema_validation_error(format!(
                "routePath needs at least 2 points, got {}",
                self.route_path.len()
            )));
        }

        for (i, point) in self.route_path.iter().enumerate() {
            point.validate(&format!("routePath[{}]", i))?;
        }

        Ok(())
    }
}

impl TripEstimate {
    pub fn derived_avg_speed_kmph(&self) -> f64 {
        self.distance_km / (self.eta_minutes / 60.0)
    }

    /// Replaces a generator-supplied average speed that disagrees with
    /// distance and eta. Returns true when the value was replaced.
    pub fn reconcile_avg_speed(&mut self) -> bool {
        let derived = self.derived_avg_speed_kmph();

        if (self.avg_speed_kmph - derived).abs() <= derived * AVG_SPEED_TOLERANCE {
            return false;
        }

        self.avg_speed_kmph = derived;
        true
    }

    /// Where a vehicle on this route is drawn: the middle path point.
    pub fn live_position(&self) -> Option<Coordinates> {
        self.route_path.get(self.route_path.len() / 2).copied()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn estimate() -> TripEstimate {
        serde_json::from_value(fixtures::generated_route()).unwrap()
    }

    #[test]
    fn generator_output_deserializes_without_names() {
        let estimate = estimate();
        assert_eq!(estimate.origin, "");
        assert_eq!(estimate.bus_stops.len(), 3);
        assert!(estimate.validate().is_ok());
    }

    #[test]
    fn missing_route_path_fails_deserialization() {
        let mut value = fixtures::generated_route();
        value.as_object_mut().unwrap().remove("routePath");

        assert!(serde_json::from_value::<TripEstimate>(value).is_err());
    }

    #[test]
    fn single_point_path_is_rejected() {
        let mut estimate = estimate();
        estimate.route_path.truncate(1);

        let err = estimate.validate().unwrap_err();
        assert!(err.is_schema_validation_error());
    }

    #[test]
    fn empty_stops_are_rejected() {
        let mut estimate = estimate();
        estimate.bus_stops.clear();

        assert!(estimate.validate().is_err());
    }

    #[test]
    fn non_positive_eta_is_rejected() {
        let mut estimate = estimate();
        estimate.eta_minutes = 0.0;

        assert!(estimate.validate().is_err());
    }

    #[test]
    fn consistent_avg_speed_is_kept() {
        let mut estimate = estimate();
        estimate.avg_speed_kmph = 53.0;

        assert!(!estimate.reconcile_avg_speed());
        assert_eq!(estimate.avg_speed_kmph, 53.0);
    }

    #[test]
    fn inconsistent_avg_speed_is_derived() {
        let mut estimate = estimate();
        estimate.avg_speed_kmph = 90.0;

        assert!(estimate.reconcile_avg_speed());
        assert_eq!(estimate.avg_speed_kmph, 50.0);
    }

    #[test]
    fn live_position_is_the_middle_point() {
        let estimate = estimate();
        assert_eq!(
            estimate.live_position(),
            Some(Coordinates::new(30.7907, 76.4977))
        );
    }
}
