mod analysis;
mod directions;
mod driver;
mod live_route;
mod location;
mod trip_estimate;

pub use analysis::{Deviation, RouteAnalysis, RouteAnalysisRequest};
pub use directions::DirectionsResult;
pub use driver::{Driver, NewDriver, Status as DriverStatus};
pub use live_route::LiveRoute;
pub use location::{Coordinates, DriverLocationEdit, ResolvedLocation};
pub use trip_estimate::{BusStop, TripEstimate};

use crate::error::Error;

/// Values received from outside that must be checked before use.
pub trait Validate {
    fn validate(&self) -> Result<(), Error>;
}

#[cfg(test)]
pub(crate) use trip_estimate::fixtures;
