use super::helpers::fetch_driver;
use super::Engine;

use async_trait::async_trait;

use crate::{
    api::MapAPI,
    auth::User,
    entities::Coordinates,
    error::Error,
    map::{route_overlay, view_for, MapOverlay, Viewport, WebMercator},
};

#[async_trait]
impl MapAPI for Engine {
    #[tracing::instrument(skip(self, route_path), fields(points = route_path.len()))]
    async fn map_view(
        &self,
        user: User,
        route_path: Vec<Coordinates>,
        driver_id: Option<String>,
        viewport: Viewport,
    ) -> Result<MapOverlay, Error> {
        let driver = match driver_id {
            Some(id) => {
                let driver = fetch_driver(self.store.as_ref(), &id).await?;
                self.authorize(user, "read", driver.clone())?;
                Some(driver)
            }
            None => None,
        };

        let view = view_for(&route_path, driver.as_ref(), viewport);
        let overlay = route_overlay(&route_path, &WebMercator::new(view, viewport));

        Ok(MapOverlay { view, overlay })
    }
}
