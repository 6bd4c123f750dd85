use axum::extract::{Extension, Json, Query};
use serde::{Deserialize, Serialize};

use crate::entities::LiveRoute;
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct RoutesParams {
    from: Option<String>,
    to: Option<String>,
}

pub async fn routes(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<RoutesParams>,
) -> Result<Json<Vec<LiveRoute>>, Error> {
    let routes = api.live_routes(params.from, params.to).await?;

    Ok(routes.into())
}
