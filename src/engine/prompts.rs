use std::ops::RangeInclusive;

use serde_json::{json, Value};

use crate::entities::RouteAnalysisRequest;
use crate::external::generation::GenerationRequest;

/// Stops asked of the generator. Not enforced on the answer.
pub const STOP_TARGET: RangeInclusive<usize> = 5..=7;
/// Path points asked of the generator. Not enforced on the answer.
pub const PATH_TARGET: RangeInclusive<usize> = 15..=30;

fn point_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "lat": { "type": "NUMBER" },
            "lng": { "type": "NUMBER" },
        },
        "required": ["lat", "lng"],
    })
}

pub fn trip_estimate_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "etaMinutes": { "type": "NUMBER", "description": "Travel time in minutes." },
            "distanceKm": { "type": "NUMBER", "description": "Road distance in kilometers." },
            "routeSummary": { "type": "STRING" },
            "avgSpeedKmph": { "type": "NUMBER", "description": "distanceKm / (etaMinutes / 60)." },
            "busStops": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "lat": { "type": "NUMBER" },
                        "lng": { "type": "NUMBER" },
                    },
                    "required": ["name", "lat", "lng"],
                },
            },
            "routePath": { "type": "ARRAY", "items": point_schema() },
        },
        "required": [
            "etaMinutes",
            "distanceKm",
            "routeSummary",
            "avgSpeedKmph",
            "busStops",
            "routePath",
        ],
    })
}

fn location_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "lat": { "type": "NUMBER" },
            "lng": { "type": "NUMBER" },
            "description": { "type": "STRING" },
        },
        "required": ["lat", "lng", "description"],
    })
}

fn route_analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "deviations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "timestamp": { "type": "STRING" },
                        "latitude": { "type": "NUMBER" },
                        "longitude": { "type": "NUMBER" },
                        "reason": { "type": "STRING" },
                    },
                    "required": ["timestamp", "latitude", "longitude", "reason"],
                },
            },
            "summary": { "type": "STRING" },
        },
        "required": ["deviations", "summary"],
    })
}

fn trip_details() -> String {
    format!(
        "Give the ETA in minutes, the distance in kilometers, a short route summary, \
         the average speed in km/h, {}-{} major bus stops along the way with their \
         coordinates, and a route path of {}-{} coordinates from the origin to the \
         destination that can be drawn on a map.",
        STOP_TARGET.start(),
        STOP_TARGET.end(),
        PATH_TARGET.start(),
        PATH_TARGET.end(),
    )
}

/// The generator estimates the whole trip from its own knowledge.
pub fn knowledge_route(origin: &str, destination: &str) -> GenerationRequest {
    let prompt = format!(
        "You are an expert travel assistant for Punjab, India. Estimate a bus trip \
         between two places, taking typical bus conditions, traffic and standard \
         routes into account.\n\nFrom: \"{}\"\nTo: \"{}\"\n\n{}",
        origin,
        destination,
        trip_details(),
    );

    GenerationRequest::new("estimate_route", prompt, trip_estimate_schema())
}

/// The generator must ground distance, duration and path in real directions.
pub fn grounded_route(origin: &str, destination: &str) -> GenerationRequest {
    let prompt = format!(
        "You are an expert travel assistant for Punjab, India. First call \
         getDirections with the origin and destination below. Use its distance, \
         duration and route path as the basis of your answer and derive the bus \
         stops and summary from that route.\n\nOrigin: \"{}\"\nDestination: \"{}\"\n\n{}",
        origin,
        destination,
        trip_details(),
    );

    GenerationRequest::new("estimate_grounded_route", prompt, trip_estimate_schema())
}

pub fn resolve_location(description: &str) -> GenerationRequest {
    let prompt = format!(
        "You are an expert geocoding assistant. Identify the precise latitude and \
         longitude of the place described below and give a brief description that \
         confirms which place you picked. Answer with latitude 0 and longitude 0 if \
         the place cannot be identified.\n\nLocation description: \"{}\"",
        description,
    );

    GenerationRequest::new("resolve_location", prompt, location_schema())
}

pub fn historical_route(input: &RouteAnalysisRequest) -> GenerationRequest {
    let prompt = format!(
        "You analyze driver routes and find deviations from the expected path.\n\n\
         Analyze the route of driver {} from {} to {}, using this location data: {}\n\
         The expected route is: {}\n\n\
         List every significant deviation with its timestamp, latitude, longitude and a \
         brief reason, then summarize the route as a whole, highlighting patterns or \
         notable issues.",
        input.driver_id,
        input.start_date.to_rfc3339(),
        input.end_date.to_rfc3339(),
        input.live_location_data,
        input.expected_route,
    );

    GenerationRequest::new("analyze_historical_route", prompt, route_analysis_schema())
}
