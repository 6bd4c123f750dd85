mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::API;
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{analysis, directions, drivers, locations, map, routes, tracker};

type DynAPI = Arc<dyn API + Send + Sync>;

pub fn router<T: API + Sync + Send + 'static>(api: T) -> Router {
    let api = Arc::new(api) as DynAPI;

    Router::new()
        .route("/routes/estimate", post(routes::estimate))
        .route("/directions", get(directions::find))
        .route("/locations/resolve", post(locations::resolve))
        .route("/drivers", post(drivers::create).get(drivers::list))
        .route("/drivers/active", get(drivers::list_active))
        .route("/drivers/events", get(drivers::events))
        .route("/drivers/:id", get(drivers::find))
        .route("/drivers/:id/location", patch(drivers::update_location))
        .route(
            "/drivers/:id/location/description",
            patch(drivers::edit_location),
        )
        .route("/drivers/:id/status", patch(drivers::update_status))
        .route("/analysis/historical", post(analysis::historical))
        .route("/tracker/routes", get(tracker::routes))
        .route("/map/view", post(map::view))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(|err| unexpected_error().with_cause(err))
}
