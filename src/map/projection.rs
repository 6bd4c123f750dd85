use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::projector::{MapView, Viewport};
use crate::entities::Coordinates;

/// Latitude where the square Web-Mercator world ends.
const MAX_MERCATOR_LAT: f64 = 85.051_128_78;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

pub trait Projection {
    /// Screen position of `point`, or `None` when it cannot be drawn.
    fn lat_lng_to_pixel(&self, point: Coordinates) -> Option<Pixel>;
}

/// Tile-pyramid projection for a map showing `view` in `viewport`.
#[derive(Clone, Copy, Debug)]
pub struct WebMercator {
    view: MapView,
    viewport: Viewport,
}

impl WebMercator {
    pub fn new(view: MapView, viewport: Viewport) -> Self {
        Self { view, viewport }
    }

    fn world_pixel(&self, point: Coordinates) -> Pixel {
        let world = 256.0 * 2f64.powi(self.view.zoom);
        let sin = (point.lat * PI / 180.0).sin();

        Pixel {
            x: (point.lng + 180.0) / 360.0 * world,
            y: (0.5 - ((1.0 + sin) / (1.0 - sin)).ln() / (4.0 * PI)) * world,
        }
    }
}

impl Projection for WebMercator {
    fn lat_lng_to_pixel(&self, point: Coordinates) -> Option<Pixel> {
        if !self.viewport.is_ready() || point.lat.abs() > MAX_MERCATOR_LAT {
            return None;
        }

        let center = self.world_pixel(self.view.center);
        let world = self.world_pixel(point);

        let pixel = Pixel {
            x: world.x - center.x + self.viewport.width / 2.0,
            y: world.y - center.y + self.viewport.height / 2.0,
        };

        let on_screen = pixel.x.is_finite()
            && pixel.y.is_finite()
            && (0.0..=self.viewport.width).contains(&pixel.x)
            && (0.0..=self.viewport.height).contains(&pixel.y);

        on_screen.then(|| pixel)
    }
}

/// What the map shows: where it looks and the route drawn over it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapOverlay {
    pub view: MapView,
    pub overlay: Option<String>,
}

/// SVG path data for a route, skipping points that do not project.
/// `None` unless at least two points remain.
pub fn route_overlay(path: &[Coordinates], projection: &impl Projection) -> Option<String> {
    if path.len() < 2 {
        return None;
    }

    let pixels: Vec<String> = path
        .iter()
        .filter_map(|point| projection.lat_lng_to_pixel(*point))
        .map(|pixel| format!("{},{}", pixel.x, pixel.y))
        .collect();

    if pixels.len() < 2 {
        return None;
    }

    Some(format!("M{}", pixels.join(" L")))
}
