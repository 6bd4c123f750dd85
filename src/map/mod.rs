mod projection;
mod projector;

pub use projection::{route_overlay, MapOverlay, Pixel, Projection, WebMercator};
pub use projector::{bounds, fit_view, view_for, MapView, Viewport, DEFAULT_VIEW, DRIVER_ZOOM};
