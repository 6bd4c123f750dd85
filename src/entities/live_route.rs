use serde::{Deserialize, Serialize};

use super::{Driver, TripEstimate};

/// An online driver placed on a generated route.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiveRoute {
    pub driver: Driver,
    pub route: TripEstimate,
}

impl LiveRoute {
    /// Keeps the route when `from` occurs no later than `to` in
    /// `[origin, stops..., destination]`. A missing filter matches the
    /// first (for `from`) or last (for `to`) position.
    pub fn matches(&self, from: Option<&str>, to: Option<&str>) -> bool {
        let stops: Vec<&str> = std::iter::once(self.route.origin.as_str())
            .chain(self.route.bus_stops.iter().map(|stop| stop.name.as_str()))
            .chain(std::iter::once(self.route.destination.as_str()))
            .collect();

        let from_index = match from {
            Some(name) => stops.iter().position(|stop| *stop == name),
            None => Some(0),
        };
        let to_index = match to {
            Some(name) => stops.iter().position(|stop| *stop == name),
            None => Some(stops.len() - 1),
        };

        match (from_index, to_index) {
            (Some(from_index), Some(to_index)) => from_index <= to_index,
            _ => false,
        }
    }
}
