use std::convert::Infallible;

use axum::extract::{Extension, Json, Path};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::entities::{Coordinates, Driver, DriverLocationEdit, DriverStatus, NewDriver};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct UpdateLocationParams {
    coordinates: Coordinates,
}

#[derive(Serialize, Deserialize)]
pub struct EditLocationParams {
    description: String,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateStatusParams {
    status: DriverStatus,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(form): Json<NewDriver>,
) -> Result<Json<Driver>, Error> {
    let driver = api.create_driver(user, form).await?;

    Ok(driver.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<String>,
) -> Result<Json<Driver>, Error> {
    let driver = api.find_driver(user, id).await?;

    Ok(driver.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<Driver>>, Error> {
    let drivers = api.list_drivers(user).await?;

    Ok(drivers.into())
}

pub async fn list_active(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<Driver>>, Error> {
    let drivers = api.list_active_drivers(user).await?;

    Ok(drivers.into())
}

pub async fn update_location(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<String>,
    Json(params): Json<UpdateLocationParams>,
) -> Result<Json<Driver>, Error> {
    let driver = api.report_location(user, id, params.coordinates).await?;

    Ok(driver.into())
}

pub async fn edit_location(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<String>,
    Json(params): Json<EditLocationParams>,
) -> Result<Json<DriverLocationEdit>, Error> {
    let edit = api
        .edit_driver_location(user, id, params.description)
        .await?;

    Ok(edit.into())
}

pub async fn update_status(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<String>,
    Json(params): Json<UpdateStatusParams>,
) -> Result<Json<Driver>, Error> {
    let driver = api.set_driver_status(user, id, params.status).await?;

    Ok(driver.into())
}

pub async fn events(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, Error> {
    let drivers = api.subscribe_drivers(user).await?;

    let events = drivers.filter_map(|driver| async move {
        match Event::default().event("driver").json_data(&driver) {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                tracing::warn!(driver = %driver.id, error = %err, "driver event not sent");
                None
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
