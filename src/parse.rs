//! Turns the `coords` query parameter into places.
//!
//! The parameter is a JSON array of `{lat, lon, population}` objects where each
//! field may be a JSON number or a numeric string. Parsing is strict: a string
//! must be a number in its entirety, so `"42abc"` is rejected rather than read
//! as `42`.

use crate::error::ServiceError;
use crate::types::Place;
use serde_json::Value;

pub fn parse_coords(raw: Option<&str>) -> Result<Vec<Place>, ServiceError> {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Err(ServiceError::MissingInput),
    };

    let value: Value =
        serde_json::from_str(raw).map_err(|e| ServiceError::MalformedJson(e.to_string()))?;

    let entries = match value {
        Value::Array(entries) => entries,
        other => {
            return Err(ServiceError::MalformedJson(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

    if entries.is_empty() {
        return Err(ServiceError::EmptyInput);
    }

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| parse_place(index, entry))
        .collect()
}

fn parse_place(index: usize, entry: &Value) -> Result<Place, ServiceError> {
    let obj = entry.as_object().ok_or_else(|| ServiceError::InvalidField {
        index,
        field: "coords",
        reason: format!("expected an object, found {}", json_kind(entry)),
    })?;

    let lat = parse_coordinate(index, "lat", obj.get("lat"))?;
    let lon = parse_coordinate(index, "lon", obj.get("lon"))?;
    let population = parse_population(index, obj.get("population"))?;

    Ok(Place::new(lat, lon, population))
}

fn parse_coordinate(index: usize, field: &'static str, value: Option<&Value>) -> Result<f64, ServiceError> {
    let invalid = |reason: String| ServiceError::InvalidField { index, field, reason };

    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(other) => return Err(invalid(format!("expected a number, found {}", json_kind(other)))),
        None => return Err(invalid("missing".to_string())),
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(invalid(format!("`{}` is not a finite number", display_raw(value)))),
    }
}

fn parse_population(index: usize, value: Option<&Value>) -> Result<u64, ServiceError> {
    let invalid = |reason: String| ServiceError::InvalidField {
        index,
        field: "population",
        reason,
    };

    let parsed = match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(other) => return Err(invalid(format!("expected an integer, found {}", json_kind(other)))),
        None => return Err(invalid("missing".to_string())),
    };

    parsed.ok_or_else(|| invalid(format!("`{}` is not a non-negative integer", display_raw(value))))
}

fn display_raw(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: ServiceError) -> &'static str {
        match err {
            ServiceError::InvalidField { field, .. } => field,
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_input() {
        assert_eq!(parse_coords(None), Err(ServiceError::MissingInput));
        assert_eq!(parse_coords(Some("")), Err(ServiceError::MissingInput));
        assert_eq!(parse_coords(Some("   ")), Err(ServiceError::MissingInput));
    }

    #[test]
    fn test_malformed_json_keeps_diagnostic() {
        match parse_coords(Some("not-json")) {
            Err(ServiceError::MalformedJson(diag)) => assert!(!diag.is_empty()),
            other => panic!("expected MalformedJson, got {:?}", other),
        }
    }

    #[test]
    fn test_non_array_is_malformed() {
        assert!(matches!(
            parse_coords(Some(r#"{"lat": 1, "lon": 2, "population": 3}"#)),
            Err(ServiceError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(parse_coords(Some("[]")), Err(ServiceError::EmptyInput));
    }

    #[test]
    fn test_mixed_numbers_and_strings_preserve_order() {
        let raw = r#"[
            {"lat": "53.35", "lon": "-6.26", "population": "1200"},
            {"lat": 51.9, "lon": -8.47, "population": 300},
            {"lat": 53.27, "lon": -9.05, "population": 80.0}
        ]"#;
        let places = parse_coords(Some(raw)).unwrap();
        assert_eq!(
            places,
            vec![
                Place::new(53.35, -6.26, 1200),
                Place::new(51.9, -8.47, 300),
                Place::new(53.27, -9.05, 80),
            ]
        );
    }

    #[test]
    fn test_non_numeric_population_is_rejected() {
        let raw = r#"[{"lat": 0, "lon": 0, "population": "abc"}]"#;
        assert_eq!(field_of(parse_coords(Some(raw)).unwrap_err()), "population");
    }

    #[test]
    fn test_numeric_prefix_is_not_accepted() {
        let raw = r#"[{"lat": 0, "lon": 0, "population": "42abc"}]"#;
        assert_eq!(field_of(parse_coords(Some(raw)).unwrap_err()), "population");

        let raw = r#"[{"lat": "12.5north", "lon": 0, "population": 1}]"#;
        assert_eq!(field_of(parse_coords(Some(raw)).unwrap_err()), "lat");
    }

    #[test]
    fn test_negative_or_fractional_population_is_rejected() {
        for pop in ["-3", "2.5", r#""-3""#] {
            let raw = format!(r#"[{{"lat": 0, "lon": 0, "population": {}}}]"#, pop);
            assert_eq!(field_of(parse_coords(Some(&raw)).unwrap_err()), "population", "{}", pop);
        }
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        for lon in [r#""NaN""#, r#""inf""#, "null", "true"] {
            let raw = format!(r#"[{{"lat": 0, "lon": {}, "population": 1}}]"#, lon);
            assert_eq!(field_of(parse_coords(Some(&raw)).unwrap_err()), "lon", "{}", lon);
        }
    }

    #[test]
    fn test_reports_offending_index() {
        let raw = r#"[{"lat": 0, "lon": 0, "population": 1}, {"lat": 0, "population": 1}]"#;
        match parse_coords(Some(raw)) {
            Err(ServiceError::InvalidField { index, field, reason }) => {
                assert_eq!(index, 1);
                assert_eq!(field, "lon");
                assert_eq!(reason, "missing");
            }
            other => panic!("expected InvalidField, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_entry() {
        let raw = r#"[[0, 0, 1]]"#;
        assert_eq!(field_of(parse_coords(Some(raw)).unwrap_err()), "coords");
    }
}
