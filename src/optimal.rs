use crate::geometry::cell_centroid;
use crate::types::{OptimalPoint, Place, VoronoiCell};

/// Index of the most populated place. On ties the lowest index wins.
pub fn max_population_index(places: &[Place]) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (i, p) in places.iter().enumerate() {
        match best {
            Some((_, pop)) if p.population <= pop => {}
            _ => best = Some((i, p.population)),
        }
    }
    best.map(|(i, _)| i)
}

/// Centroid of the Voronoi cell built for the most populated place.
///
/// `None` when there are no cells, or the winning place has none.
pub fn select_optimal_point(places: &[Place], cells: Option<&[VoronoiCell]>) -> Option<OptimalPoint> {
    let cells = cells?;
    let winner = max_population_index(places)?;
    let cell = cells.iter().find(|c| c.site == winner)?;
    let (lat, lon) = cell_centroid(cell)?;
    Some(OptimalPoint { lat, lon })
}
