//! Per-route orchestration: parse, summarise, run the geometry, shape GeoJSON.
//!
//! Everything here is synchronous and CPU-bound; the server runs it on the
//! blocking pool.

use crate::config::GeometryConfig;
use crate::error::ServiceError;
use crate::geometry;
use crate::optimal::select_optimal_point;
use crate::parse::parse_coords;
use crate::summary::{bounding_box, center};
use crate::types::{OptimalPoint, Place, VoronoiCell};
use geojson::{Feature, FeatureCollection, JsonObject};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateResponse {
    pub bounding_box: [f64; 4],
    pub center: [f64; 2],
    pub optimal_point: Option<OptimalPoint>,
    pub voronoi_polygons: Option<FeatureCollection>,
    pub concave_hull: Option<Feature>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcaveHullResponse {
    pub concave_hull: Feature,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalPointResponse {
    pub optimal_point: OptimalPoint,
}

/// Everything at once. Geometry that cannot be built is reported as `null`.
pub fn calculate(raw: Option<&str>, settings: &GeometryConfig) -> Result<CalculateResponse, ServiceError> {
    let places = parse_coords(raw)?;
    let bbox = bounding_box(&places, settings.padding)?;
    let mean = center(&places)?;

    let hull = geometry::concave_hull(&places, settings.max_edge, settings.units);
    let cells = geometry::voronoi(&places, &bbox);
    let optimal_point = select_optimal_point(&places, cells.as_deref());

    tracing::debug!(
        places = places.len(),
        hull = hull.is_some(),
        cells = cells.as_ref().map_or(0, Vec::len),
        "Calculated summary"
    );

    Ok(CalculateResponse {
        bounding_box: bbox.to_array(),
        center: mean.to_array(),
        optimal_point,
        voronoi_polygons: cells.map(|c| voronoi_collection(&places, &c)),
        concave_hull: hull.as_ref().map(hull_feature),
    })
}

pub fn concave_hull_only(raw: Option<&str>, settings: &GeometryConfig) -> Result<ConcaveHullResponse, ServiceError> {
    let places = parse_coords(raw)?;
    let hull = geometry::concave_hull(&places, settings.max_edge, settings.units)
        .ok_or(ServiceError::HullUnavailable)?;
    Ok(ConcaveHullResponse {
        concave_hull: hull_feature(&hull),
    })
}

pub fn optimal_point_only(raw: Option<&str>, settings: &GeometryConfig) -> Result<OptimalPointResponse, ServiceError> {
    let places = parse_coords(raw)?;
    let bbox = bounding_box(&places, settings.padding)?;
    let cells = geometry::voronoi(&places, &bbox).ok_or(ServiceError::VoronoiUnavailable)?;
    let optimal_point =
        select_optimal_point(&places, Some(cells.as_slice())).ok_or(ServiceError::OptimalPointUnavailable)?;
    Ok(OptimalPointResponse { optimal_point })
}

fn voronoi_collection(places: &[Place], cells: &[VoronoiCell]) -> FeatureCollection {
    let features = cells
        .iter()
        .map(|cell| {
            let mut properties = JsonObject::new();
            properties.insert("site".to_string(), cell.site.into());
            if let Some(place) = places.get(cell.site) {
                properties.insert("population".to_string(), place.population.into());
            }
            Feature {
                bbox: None,
                geometry: Some(geojson::Geometry::new(geojson::Value::from(&cell.polygon))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn hull_feature(hull: &geo::Geometry<f64>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(hull))),
        id: None,
        properties: Some(JsonObject::new()),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TRIANGLE: &str = r#"[
        {"lat": 0, "lon": 0, "population": 10},
        {"lat": 1, "lon": 1, "population": 50},
        {"lat": 0, "lon": 1, "population": 5}
    ]"#;

    #[test]
    fn test_calculate_shapes_every_artifact() {
        let settings = GeometryConfig::default();
        let response = calculate(Some(TRIANGLE), &settings).unwrap();
        assert_eq!(response.bounding_box, [-0.02, -0.02, 1.02, 1.02]);
        assert!(response.optimal_point.is_some());
        // ~111km edges never fit under 1.5km
        assert!(response.concave_hull.is_none());

        let voronoi = response.voronoi_polygons.expect("voronoi");
        assert_eq!(voronoi.features.len(), 3);
        let sites: Vec<_> = voronoi
            .features
            .iter()
            .map(|f| f.property("site").cloned())
            .collect();
        assert_eq!(sites, vec![Some(json!(0)), Some(json!(1)), Some(json!(2))]);
        assert_eq!(voronoi.features[1].property("population"), Some(&json!(50)));
    }

    #[test]
    fn test_calculate_serializes_nulls() {
        let settings = GeometryConfig::default();
        let raw = r#"[{"lat": 53.3, "lon": -6.2, "population": 4}]"#;
        let body = serde_json::to_value(calculate(Some(raw), &settings).unwrap()).unwrap();
        assert_eq!(body["center"], json!([53.3, -6.2]));
        assert!(body["optimalPoint"].is_null());
        assert!(body["voronoiPolygons"].is_null());
        assert!(body["concaveHull"].is_null());
    }

    #[test]
    fn test_split_hull_unavailable() {
        let settings = GeometryConfig::default();
        assert_eq!(
            concave_hull_only(Some(TRIANGLE), &settings).unwrap_err(),
            ServiceError::HullUnavailable
        );

        let wide = GeometryConfig {
            max_edge: 500.0,
            ..GeometryConfig::default()
        };
        let response = concave_hull_only(Some(TRIANGLE), &wide).unwrap();
        let body = serde_json::to_value(response).unwrap();
        assert_eq!(body["concaveHull"]["type"], "Feature");
        assert_eq!(body["concaveHull"]["geometry"]["type"], "Polygon");
    }

    #[test]
    fn test_split_optimal_point() {
        let settings = GeometryConfig::default();
        let response = optimal_point_only(Some(TRIANGLE), &settings).unwrap();
        assert!(response.optimal_point.lat > 0.5);

        let two = r#"[{"lat": 0, "lon": 0, "population": 1}, {"lat": 1, "lon": 1, "population": 2}]"#;
        assert_eq!(
            optimal_point_only(Some(two), &settings).unwrap_err(),
            ServiceError::VoronoiUnavailable
        );
    }

    #[test]
    fn test_validation_runs_first() {
        let settings = GeometryConfig::default();
        assert_eq!(calculate(None, &settings).unwrap_err(), ServiceError::MissingInput);
        assert_eq!(concave_hull_only(Some("[]"), &settings).unwrap_err(), ServiceError::EmptyInput);
        assert!(matches!(
            optimal_point_only(Some("not-json"), &settings).unwrap_err(),
            ServiceError::MalformedJson(_)
        ));
    }
}
