use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::auth::User;
use crate::entities::{
    Coordinates, DirectionsResult, Driver, DriverLocationEdit, DriverStatus, LiveRoute,
    NewDriver, ResolvedLocation, RouteAnalysis, RouteAnalysisRequest, TripEstimate,
};
use crate::error::Error;
use crate::map::{MapOverlay, Viewport};

#[async_trait]
pub trait RouteAPI {
    /// Estimate for a trip, generated once per (origin, destination) and
    /// served from the route cache afterwards.
    async fn estimate_route(
        &self,
        origin: String,
        destination: String,
    ) -> Result<TripEstimate, Error>;
}

#[async_trait]
pub trait DirectionsAPI {
    async fn get_directions(
        &self,
        origin: String,
        destination: String,
    ) -> Result<DirectionsResult, Error>;
}

#[async_trait]
pub trait LocationAPI {
    async fn resolve_location(&self, description: String) -> Result<ResolvedLocation, Error>;

    async fn edit_driver_location(
        &self,
        user: User,
        driver_id: String,
        description: String,
    ) -> Result<DriverLocationEdit, Error>;
}

#[async_trait]
pub trait DriverAPI {
    async fn create_driver(&self, user: User, form: NewDriver) -> Result<Driver, Error>;

    async fn find_driver(&self, user: User, id: String) -> Result<Driver, Error>;

    async fn list_drivers(&self, user: User) -> Result<Vec<Driver>, Error>;

    async fn list_active_drivers(&self, user: User) -> Result<Vec<Driver>, Error>;

    async fn report_location(
        &self,
        user: User,
        id: String,
        coordinates: Coordinates,
    ) -> Result<Driver, Error>;

    async fn set_driver_status(
        &self,
        user: User,
        id: String,
        status: DriverStatus,
    ) -> Result<Driver, Error>;

    /// Every later write to a driver document, in commit order.
    async fn subscribe_drivers(&self, user: User) -> Result<BoxStream<'static, Driver>, Error>;
}

#[async_trait]
pub trait AnalysisAPI {
    async fn analyze_historical_route(
        &self,
        user: User,
        input: RouteAnalysisRequest,
    ) -> Result<RouteAnalysis, Error>;
}

#[async_trait]
pub trait TrackerAPI {
    async fn live_routes(
        &self,
        from: Option<String>,
        to: Option<String>,
    ) -> Result<Vec<LiveRoute>, Error>;
}

#[async_trait]
pub trait MapAPI {
    /// Centring on a driver requires permission to read that driver.
    async fn map_view(
        &self,
        user: User,
        route_path: Vec<Coordinates>,
        driver_id: Option<String>,
        viewport: Viewport,
    ) -> Result<MapOverlay, Error>;
}

pub trait API:
    RouteAPI + DirectionsAPI + LocationAPI + DriverAPI + AnalysisAPI + TrackerAPI + MapAPI
{
}
