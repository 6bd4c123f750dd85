pub mod gemini;
pub mod generation;
pub mod google_maps;
pub mod polyline;
