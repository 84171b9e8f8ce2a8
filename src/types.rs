use geo::Polygon;
use serde::Serialize;

/// One populated input location, in the order it arrived.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    pub lat: f64,
    pub lon: f64,
    pub population: u64,
}

impl Place {
    pub fn new(lat: f64, lon: f64, population: u64) -> Self {
        Self { lat, lon, population }
    }
}

/// Padded axis-aligned extent of a point set, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// `[west, south, east, north]`, the GeoJSON bbox order.
    pub fn to_array(self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    pub fn contains(&self, place: &Place) -> bool {
        place.lon > self.west && place.lon < self.east && place.lat > self.south && place.lat < self.north
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Center {
    pub lat: f64,
    pub lon: f64,
}

impl Center {
    /// `[lat, lon]`
    pub fn to_array(self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// A Voronoi cell tagged with the index of the input place it was built for.
#[derive(Debug, Clone, PartialEq)]
pub struct VoronoiCell {
    pub site: usize,
    pub polygon: Polygon<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalPoint {
    pub lat: f64,
    pub lon: f64,
}
