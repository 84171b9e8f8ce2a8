//! Bridge between places and the geometry libraries.
//!
//! Places are latitude-first; `geo`, `delaunator` and `voronator` all work in
//! `x = longitude, y = latitude`. Every crossing of that boundary goes through
//! [`to_coord`] / [`to_lat_lon`].

use crate::types::{BoundingBox, Place, VoronoiCell};
use geo::algorithm::kernels::{Kernel, Orientation, RobustKernel};
use geo::{
    coord, BooleanOps, Centroid, Coord, Distance, Geometry, Haversine, LineString, MultiPoint,
    MultiPolygon, Point, Polygon,
};
use serde::Deserialize;
use std::collections::HashMap;
use voronator::delaunator::Point as VoronoiSite;
use voronator::VoronoiDiagram;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Kilometers,
    Meters,
    Miles,
}

impl LengthUnit {
    pub fn from_meters(self, meters: f64) -> f64 {
        match self {
            LengthUnit::Kilometers => meters / 1000.0,
            LengthUnit::Meters => meters,
            LengthUnit::Miles => meters / 1609.344,
        }
    }
}

pub fn to_coord(place: &Place) -> Coord<f64> {
    coord! { x: place.lon, y: place.lat }
}

/// `(lat, lon)` of a library coordinate.
pub fn to_lat_lon(c: Coord<f64>) -> (f64, f64) {
    (c.y, c.x)
}

// -0.0 and 0.0 are the same site
fn site_key(c: Coord<f64>) -> (u64, u64) {
    ((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
}

/// Distinct coordinates in first-seen order, plus the slot each place maps to.
fn distinct_sites(places: &[Place]) -> (Vec<Coord<f64>>, Vec<usize>) {
    let mut seen: HashMap<(u64, u64), usize> = HashMap::new();
    let mut sites = Vec::new();
    let slots: Vec<usize> = places
        .iter()
        .map(|p| {
            let c = to_coord(p);
            *seen.entry(site_key(c)).or_insert_with(|| {
                sites.push(c);
                sites.len() - 1
            })
        })
        .collect();
    (sites, slots)
}

fn all_collinear(sites: &[Coord<f64>]) -> bool {
    let (first, rest) = match sites.split_first() {
        Some(split) => split,
        None => return true,
    };
    let second = match rest.first() {
        Some(c) => *c,
        None => return true,
    };
    rest.iter()
        .all(|c| RobustKernel::orient2d(*first, second, *c) == Orientation::Collinear)
}

/// Concave hull of the places: Delaunay triangles whose edges are all no longer
/// than `max_edge` (great-circle distance in `units`), dissolved into one shape.
///
/// Returns `None` when fewer than three distinct points exist or no triangle
/// survives the edge filter.
pub fn concave_hull(places: &[Place], max_edge: f64, units: LengthUnit) -> Option<Geometry<f64>> {
    let (sites, _) = distinct_sites(places);
    if sites.len() < 3 {
        return None;
    }

    let d_points: Vec<delaunator::Point> = sites
        .iter()
        .map(|c| delaunator::Point { x: c.x, y: c.y })
        .collect();
    let triangulation = delaunator::triangulate(&d_points);

    let short_enough = |a: usize, b: usize| {
        let meters = Haversine.distance(Point::from(sites[a]), Point::from(sites[b]));
        units.from_meters(meters) <= max_edge
    };

    let kept: Vec<Polygon<f64>> = triangulation
        .triangles
        .chunks_exact(3)
        .filter(|t| short_enough(t[0], t[1]) && short_enough(t[1], t[2]) && short_enough(t[2], t[0]))
        .map(|t| {
            Polygon::new(
                LineString::from(vec![sites[t[0]], sites[t[1]], sites[t[2]]]),
                vec![],
            )
        })
        .collect();

    if kept.is_empty() {
        tracing::debug!(
            triangles = triangulation.triangles.len() / 3,
            max_edge,
            "No triangle survived the edge filter"
        );
        return None;
    }

    let dissolved = kept
        .iter()
        .fold(MultiPolygon::new(vec![]), |acc, triangle| acc.union(triangle));

    let mut parts = dissolved.0;
    match parts.len() {
        0 => None,
        1 => parts.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(MultiPolygon::new(parts))),
    }
}

/// Voronoi partition of the places, clipped to `bbox`.
///
/// Every returned cell carries the index of the place it belongs to; places
/// sharing a coordinate share a cell. Returns `None` for fewer than three
/// distinct points or when all points are collinear.
pub fn voronoi(places: &[Place], bbox: &BoundingBox) -> Option<Vec<VoronoiCell>> {
    let (sites, slots) = distinct_sites(places);
    if sites.len() < 3 || all_collinear(&sites) {
        return None;
    }

    let tuples: Vec<(f64, f64)> = sites.iter().map(|c| (c.x, c.y)).collect();
    let diagram = VoronoiDiagram::<VoronoiSite>::from_tuple(
        &(bbox.west, bbox.south),
        &(bbox.east, bbox.north),
        &tuples,
    )?;

    let polygons: Vec<Option<Polygon<f64>>> = diagram
        .cells()
        .iter()
        .map(|cell| {
            let mut ring: Vec<Coord<f64>> = cell
                .points()
                .iter()
                .map(|p| coord! { x: p.x, y: p.y })
                .collect();
            ring.dedup();
            let polygon = Polygon::new(LineString::from(ring), vec![]);
            // closed ring of at least three distinct vertices
            (polygon.exterior().0.len() >= 4).then_some(polygon)
        })
        .collect();

    let cells = slots
        .iter()
        .enumerate()
        .filter_map(|(site, slot)| {
            polygons
                .get(*slot)
                .and_then(|p| p.clone())
                .map(|polygon| VoronoiCell { site, polygon })
        })
        .collect();

    Some(cells)
}

/// Mean of the cell's ring vertices, closing vertex excluded.
pub fn cell_centroid(cell: &VoronoiCell) -> Option<(f64, f64)> {
    let ring = &cell.polygon.exterior().0;
    let open = match ring.split_last() {
        Some((last, rest)) if rest.first() == Some(last) => rest,
        _ => ring.as_slice(),
    };
    let vertices: MultiPoint<f64> = open.iter().map(|c| Point::from(*c)).collect();
    vertices.centroid().map(|p| to_lat_lon(p.0))
}
