use std::sync::Arc;

use yatra::config::Config;
use yatra::db::PgStore;
use yatra::engine::Engine;
use yatra::error::Error;
use yatra::external::{gemini::Gemini, google_maps::GoogleMaps};
use yatra::server::serve;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;

    let store = PgStore::new(&config.database_url, config.database_max_connections).await?;
    let generator = Gemini::new(
        config.gemini_api_base,
        config.gemini_api_key,
        config.gemini_model,
    );

    if config.google_maps_api_key.is_none() {
        tracing::warn!("GOOGLE_MAPS_API_KEY is not set, directions are unavailable");
    }
    let directions = GoogleMaps::new(config.google_maps_api_base, config.google_maps_api_key);

    let engine = Engine::new(
        Arc::new(store),
        Arc::new(generator),
        Arc::new(directions),
        config.route_grounding,
    )?;

    serve(engine, config.bind_addr).await
}
