use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::entities::ResolvedLocation;
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct ResolveParams {
    description: String,
}

pub async fn resolve(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<ResolveParams>,
) -> Result<Json<ResolvedLocation>, Error> {
    let location = api.resolve_location(params.description).await?;

    Ok(location.into())
}
