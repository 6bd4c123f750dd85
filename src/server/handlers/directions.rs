use axum::extract::{Extension, Json, Query};
use serde::{Deserialize, Serialize};

use crate::server::DynAPI;
use crate::{entities::DirectionsResult, error::Error};

#[derive(Serialize, Deserialize)]
pub struct DirectionsParams {
    origin: String,
    destination: String,
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<DirectionsParams>,
) -> Result<Json<DirectionsResult>, Error> {
    let directions = api
        .get_directions(params.origin, params.destination)
        .await?;

    Ok(directions.into())
}
