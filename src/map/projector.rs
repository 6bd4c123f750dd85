use std::f64::consts::PI;

use geo_types::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::entities::{Coordinates, Driver};

const WORLD_TILE_SIZE: f64 = 256.0;
const MAX_ZOOM: f64 = 21.0;

/// Zoom used when centring on a single driver.
pub const DRIVER_ZOOM: i32 = 13;

/// Whole-country view shown when there is nothing to focus on.
pub const DEFAULT_VIEW: MapView = MapView {
    center: Coordinates {
        lat: 20.5937,
        lng: 78.9629,
    },
    zoom: 5,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn is_ready(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinates,
    pub zoom: i32,
}

/// Smallest lat/lng box holding every point, x = lng and y = lat.
pub fn bounds(points: &[Coordinates]) -> Option<Rect<f64>> {
    let first = points.first()?;
    let init = (first.lat, first.lat, first.lng, first.lng);

    let (min_lat, max_lat, min_lng, max_lng) =
        points
            .iter()
            .fold(init, |(min_lat, max_lat, min_lng, max_lng), p| {
                (
                    min_lat.min(p.lat),
                    max_lat.max(p.lat),
                    min_lng.min(p.lng),
                    max_lng.max(p.lng),
                )
            });

    Some(Rect::new(
        Coord {
            x: min_lng,
            y: min_lat,
        },
        Coord {
            x: max_lng,
            y: max_lat,
        },
    ))
}

fn lat_rad(lat: f64) -> f64 {
    let sin = (lat * PI / 180.0).sin();
    let rad_x2 = ((1.0 + sin) / (1.0 - sin)).ln() / 2.0;

    rad_x2.clamp(-PI, PI) / 2.0
}

fn zoom_for(axis_pixels: f64, world_pixels: f64, fraction: f64) -> f64 {
    (axis_pixels / world_pixels / fraction).log2().floor()
}

/// Centre and zoom that fit `points` into `viewport`, one level zoomed
/// out for padding. `None` for fewer than two points or an unsized
/// viewport.
pub fn fit_view(points: &[Coordinates], viewport: Viewport) -> Option<MapView> {
    if points.len() < 2 || !viewport.is_ready() {
        return None;
    }

    let rect = bounds(points)?;
    let (min, max) = (rect.min(), rect.max());

    let lat_fraction = (lat_rad(max.y) - lat_rad(min.y)) / PI;

    let lng_diff = max.x - min.x;
    let lng_fraction = if lng_diff < 0.0 {
        lng_diff + 360.0
    } else {
        lng_diff
    } / 360.0;

    let lat_zoom = zoom_for(viewport.height, WORLD_TILE_SIZE, lat_fraction);
    let lng_zoom = zoom_for(viewport.width, WORLD_TILE_SIZE, lng_fraction);

    let zoom = lat_zoom.min(lng_zoom).min(MAX_ZOOM) - 1.0;

    Some(MapView {
        center: rect.center().into(),
        zoom: zoom as i32,
    })
}

/// A route wins over a selected driver, which wins over the default view.
pub fn view_for(
    route_path: &[Coordinates],
    selected_driver: Option<&Driver>,
    viewport: Viewport,
) -> MapView {
    if let Some(view) = fit_view(route_path, viewport) {
        return view;
    }

    match selected_driver {
        Some(driver) if driver.has_location() => MapView {
            center: driver.last_location,
            zoom: DRIVER_ZOOM,
        },
        _ => DEFAULT_VIEW,
    }
}
