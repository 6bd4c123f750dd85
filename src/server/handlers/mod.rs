pub mod analysis;
pub mod directions;
pub mod drivers;
pub mod locations;
pub mod map;
pub mod routes;
pub mod tracker;
