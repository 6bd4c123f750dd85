use axum::extract::{Extension, Json};

use crate::auth::User;
use crate::entities::{RouteAnalysis, RouteAnalysisRequest};
use crate::error::Error;
use crate::server::DynAPI;

pub async fn historical(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(input): Json<RouteAnalysisRequest>,
) -> Result<Json<RouteAnalysis>, Error> {
    let analysis = api.analyze_historical_route(user, input).await?;

    Ok(analysis.into())
}
