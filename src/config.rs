use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::{invalid_input_error, Error};

/// How the route estimator sources distance, duration and path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteGrounding {
    /// The generator answers from its own knowledge.
    Knowledge,
    /// The generator calls the directions tool first.
    Directions,
}

impl FromStr for RouteGrounding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "knowledge" => Ok(Self::Knowledge),
            "directions" => Ok(Self::Directions),
            other => Err(invalid_input_error(format!(
                "ROUTE_GROUNDING must be `knowledge` or `directions`, got `{}`",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub gemini_api_base: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub google_maps_api_base: String,
    pub google_maps_api_key: Option<String>,
    pub route_grounding: RouteGrounding,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
            bind_addr: parse_or("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            gemini_api_base: var_or(
                "GEMINI_API_BASE",
                "https://generativelanguage.googleapis.com",
            ),
            gemini_api_key: env::var("GEMINI_API_KEY")?,
            gemini_model: var_or("GEMINI_MODEL", "gemini-2.0-flash"),
            google_maps_api_base: var_or("GOOGLE_MAPS_API_BASE", "https://maps.googleapis.com"),
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            route_grounding: parse_or("ROUTE_GROUNDING", RouteGrounding::Knowledge)?,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.into())
}

fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T, Error> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| invalid_input_error(format!("{} is malformed: `{}`", name, raw))),
        Err(_) => Ok(default),
    }
}
