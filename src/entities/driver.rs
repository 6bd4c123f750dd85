use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};

use super::Coordinates;
use crate::error::{invalid_input_error, Error};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, PolarClass)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    #[polar(attribute)]
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub last_location: Coordinates,
    pub status: Status,
    pub last_seen: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Online,
    Offline,
    Inactive,
}

/// Registration form for a new driver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewDriver {
    pub id: String,
    pub name: String,
}

impl NewDriver {
    pub fn validate(&self) -> Result<(), Error> {
        if self.id.trim().chars().count() < 3 {
            return Err(invalid_input_error("driver id must be at least 3 characters"));
        }

        if self.name.trim().chars().count() < 2 {
            return Err(invalid_input_error("name must be at least 2 characters"));
        }

        Ok(())
    }
}

impl Driver {
    pub fn new(form: NewDriver, avatar: String, now: DateTime<Utc>) -> Self {
        Self {
            id: form.id.trim().into(),
            name: form.name.trim().into(),
            avatar,
            last_location: Coordinates::new(0.0, 0.0),
            status: Status::Inactive,
            last_seen: now,
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == Status::Online
    }

    /// Drivers that never reported a position sit at (0, 0) and are not drawn.
    pub fn has_location(&self) -> bool {
        !self.last_location.is_zero()
    }
}
