use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::User;
use crate::entities::Coordinates;
use crate::error::Error;
use crate::map::{MapOverlay, Viewport};
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewParams {
    #[serde(default)]
    route_path: Vec<Coordinates>,
    driver_id: Option<String>,
    viewport: Viewport,
}

pub async fn view(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<ViewParams>,
) -> Result<Json<MapOverlay>, Error> {
    let map = api
        .map_view(user, params.route_path, params.driver_id, params.viewport)
        .await?;

    Ok(map.into())
}
