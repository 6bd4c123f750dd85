use geo_types::Coord;
use serde::{Deserialize, Serialize};

use super::Validate;
use crate::error::{schema_validation_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_zero(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }

    /// Fails when either component is non-finite or outside its degree range.
    pub fn validate(&self, field: &str) -> Result<(), Error> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(schema_validation_error(format!(
                "{}.lat out of range: {}",
                field, self.lat
            )));
        }

        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(schema_validation_error(format!(
                "{}.lng out of range: {}",
                field, self.lng
            )));
        }

        Ok(())
    }
}

impl From<Coordinates> for Coord<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Coord {
            x: coordinates.lng,
            y: coordinates.lat,
        }
    }
}

impl From<Coord<f64>> for Coordinates {
    fn from(coord: Coord<f64>) -> Self {
        Self {
            lat: coord.y,
            lng: coord.x,
        }
    }
}

/// A place the text generator located from a free-form description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub lat: f64,
    pub lng: f64,
    pub description: String,
}

impl ResolvedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

impl Validate for ResolvedLocation {
    fn validate(&self) -> Result<(), Error> {
        self.coordinates().validate("location")
    }
}

/// Result of moving a driver to a described place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverLocationEdit {
    pub driver_id: String,
    pub location: ResolvedLocation,
}
