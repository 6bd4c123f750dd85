//! Decoder for the Google encoded polyline format.
//!
//! Each coordinate is a zig-zag encoded delta from the previous one at
//! 1e-5 degree precision, written in 5-bit chunks offset by 63 with bit
//! 0x20 marking continuation.

use crate::entities::Coordinates;
use crate::error::{schema_validation_error, Error};

const PRECISION: f64 = 1e5;

pub fn decode(encoded: &str) -> Result<Vec<Coordinates>, Error> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut path = Vec::new();

    while index < bytes.len() {
        lat += next_delta(bytes, &mut index)?;
        lng += next_delta(bytes, &mut index)?;

        path.push(Coordinates::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(path)
}

fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, Error> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes
            .get(*index)
            .ok_or_else(|| schema_validation_error("polyline ends mid-coordinate"))?;

        if !(63..=126).contains(&byte) {
            return Err(schema_validation_error(format!(
                "invalid polyline byte {:#04x} at {}",
                byte, *index
            )));
        }

        // 32 bits is plenty for +-180 degrees at 1e-5
        if shift > 30 {
            return Err(schema_validation_error("polyline chunk run too long"));
        }

        *index += 1;

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
