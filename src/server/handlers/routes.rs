use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::server::DynAPI;
use crate::{entities::TripEstimate, error::Error};

#[derive(Serialize, Deserialize)]
pub struct EstimateParams {
    origin: String,
    destination: String,
}

pub async fn estimate(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<EstimateParams>,
) -> Result<Json<TripEstimate>, Error> {
    let estimate = api
        .estimate_route(params.origin, params.destination)
        .await?;

    Ok(estimate.into())
}
