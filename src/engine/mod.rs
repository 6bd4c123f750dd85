mod analysis_api;
mod directions_api;
mod directions_tool;
mod driver_api;
mod helpers;
mod location_api;
mod map_api;
mod prompts;
mod route_api;
mod route_cache;
mod tracker_api;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use oso::Oso;

use crate::{
    api::API,
    auth::authorizor,
    config::RouteGrounding,
    db::DocumentStore,
    error::{unauthorized_error, Error},
    external::{generation::TextGenerator, google_maps::DirectionsProvider},
};

pub use directions_tool::DirectionsTool;
pub use route_cache::{cache_key, RouteCache, ROUTE_CACHE_COLLECTION};
pub use tracker_api::PUNJAB_CITIES;

pub struct Engine {
    store: Arc<dyn DocumentStore>,
    generator: Arc<dyn TextGenerator>,
    directions: Arc<dyn DirectionsProvider>,
    grounding: RouteGrounding,
    routes: RouteCache,
    authorizor: Oso,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all, fields(grounding = ?grounding))]
    pub fn new(
        store: Arc<dyn DocumentStore>,
        generator: Arc<dyn TextGenerator>,
        directions: Arc<dyn DirectionsProvider>,
        grounding: RouteGrounding,
    ) -> Result<Self, Error> {
        Ok(Self {
            routes: RouteCache::new(store.clone()),
            store,
            generator,
            directions,
            grounding,
            authorizor: authorizor::new()?,
        })
    }
}

impl Engine {
    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(unauthorized_error())
    }
}

impl API for Engine {}
