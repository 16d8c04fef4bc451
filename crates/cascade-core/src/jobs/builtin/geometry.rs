//! GeoJSON polygon helpers shared by the analysis and area jobs.

use serde_json::Value;

use crate::error::JobError;

/// WGS84 equatorial radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// `[lon, lat]` pairs of each ring; the first ring is the outer boundary.
pub type Ring = Vec<(f64, f64)>;

/// Extract the rings of a GeoJSON `Feature<Polygon>` or bare `Polygon`.
pub fn polygon_rings(input: &Value) -> Result<Vec<Ring>, JobError> {
    let geometry = match input.get("type").and_then(Value::as_str) {
        Some("Feature") => input
            .get("geometry")
            .ok_or_else(|| invalid("feature has no geometry"))?,
        Some("Polygon") => input,
        Some(other) => return Err(invalid(format!("unsupported geometry type: {other}"))),
        None => return Err(invalid("input is not a GeoJSON object")),
    };
    if geometry.get("type").and_then(Value::as_str) != Some("Polygon") {
        return Err(invalid("geometry is not a Polygon"));
    }

    let rings = geometry
        .get("coordinates")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("polygon has no coordinates"))?;
    if rings.is_empty() {
        return Err(invalid("polygon has no rings"));
    }

    rings.iter().map(parse_ring).collect()
}

fn parse_ring(ring: &Value) -> Result<Ring, JobError> {
    let points = ring
        .as_array()
        .ok_or_else(|| invalid("ring is not an array"))?;
    points
        .iter()
        .map(|point| match point.as_array().map(Vec::as_slice) {
            Some([lon, lat, ..]) => match (lon.as_f64(), lat.as_f64()) {
                (Some(lon), Some(lat)) => Ok((lon, lat)),
                _ => Err(invalid("coordinate is not numeric")),
            },
            _ => Err(invalid("position needs longitude and latitude")),
        })
        .collect()
}

fn invalid(msg: impl Into<String>) -> JobError {
    JobError::InvalidInput(msg.into())
}

/// Signed spherical area of one ring in square meters.
pub fn ring_area(ring: &[(f64, f64)]) -> f64 {
    let len = ring.len();
    if len <= 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..len {
        let (lower, middle, upper) = if i == len - 2 {
            (len - 2, len - 1, 0)
        } else if i == len - 1 {
            (len - 1, 0, 1)
        } else {
            (i, i + 1, i + 2)
        };
        let lower_lon = ring[lower].0.to_radians();
        let middle_lat = ring[middle].1.to_radians();
        let upper_lon = ring[upper].0.to_radians();
        total += (upper_lon - lower_lon) * middle_lat.sin();
    }

    total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0
}

/// Area of the outer ring minus its holes.
pub fn polygon_area(rings: &[Ring]) -> f64 {
    let Some((outer, holes)) = rings.split_first() else {
        return 0.0;
    };
    holes
        .iter()
        .fold(ring_area(outer).abs(), |area, hole| area - ring_area(hole).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const UNIT_SQUARE_M2: f64 = 12_391_399_902.071104;

    fn unit_square() -> Value {
        json!({
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
            }
        })
    }

    #[test]
    fn area_of_one_degree_square() {
        let rings = polygon_rings(&unit_square()).unwrap();
        let area = polygon_area(&rings);
        assert!((area - UNIT_SQUARE_M2).abs() < 1.0, "area = {area}");
    }

    #[test]
    fn ring_orientation_does_not_matter() {
        let mut ring = polygon_rings(&unit_square()).unwrap().remove(0);
        ring.reverse();
        let area = polygon_area(&[ring]);
        assert!((area - UNIT_SQUARE_M2).abs() < 1.0);
    }

    #[test]
    fn holes_are_subtracted() {
        let polygon = json!({
            "type": "Polygon",
            "coordinates": [
                [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
                [[0.25, 0.25], [0.75, 0.25], [0.75, 0.75], [0.25, 0.75], [0.25, 0.25]]
            ]
        });
        let area = polygon_area(&polygon_rings(&polygon).unwrap());
        assert!((area - 9_293_520_436.973568).abs() < 1.0, "area = {area}");
    }

    #[test]
    fn short_ring_has_no_area() {
        assert_eq!(ring_area(&[(0.0, 0.0), (1.0, 1.0)]), 0.0);
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let point = json!({"type": "Point", "coordinates": [1.0, 2.0]});
        assert!(matches!(polygon_rings(&point), Err(JobError::InvalidInput(_))));

        let line = json!({"type": "LineString", "coordinates": []});
        let feature = json!({"type": "Feature", "geometry": line});
        assert!(matches!(polygon_rings(&feature), Err(JobError::InvalidInput(_))));

        assert!(matches!(polygon_rings(&Value::Null), Err(JobError::InvalidInput(_))));
    }

    #[test]
    fn rejects_malformed_positions() {
        let polygon = json!({"type": "Polygon", "coordinates": [[[0.0], [1.0, "a"]]]});
        assert!(matches!(polygon_rings(&polygon), Err(JobError::InvalidInput(_))));
    }
}
