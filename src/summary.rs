use crate::error::ServiceError;
use crate::types::{BoundingBox, Center, Place};

/// Padding added on every side of the bounding box, in degrees.
pub const DEFAULT_PADDING: f64 = 0.02;

/// Min/max extent of the places, pushed outward by `padding` on each side.
pub fn bounding_box(places: &[Place], padding: f64) -> Result<BoundingBox, ServiceError> {
    if places.is_empty() {
        return Err(ServiceError::EmptyInput);
    }

    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in places {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
    }

    Ok(BoundingBox {
        west: min_lon - padding,
        south: min_lat - padding,
        east: max_lon + padding,
        north: max_lat + padding,
    })
}

/// Arithmetic mean of latitude and longitude.
pub fn center(places: &[Place]) -> Result<Center, ServiceError> {
    if places.is_empty() {
        return Err(ServiceError::EmptyInput);
    }

    let n = places.len() as f64;
    let lat = places.iter().map(|p| p.lat).sum::<f64>() / n;
    let lon = places.iter().map(|p| p.lon).sum::<f64>() / n;
    Ok(Center { lat, lon })
}
