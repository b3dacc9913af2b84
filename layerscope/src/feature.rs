//! Helpers for reading GeoJSON features.

use geojson::{Feature, Geometry, JsonObject, Value};

/// Returns `(lon, lat)` of a `Point` feature. Other geometries, points with less than two
/// ordinates and non-finite coordinates give `None`.
pub fn point_lonlat(feature: &Feature) -> Option<(f64, f64)> {
    match &feature.geometry.as_ref()?.value {
        Value::Point(position) if position.len() >= 2 => {
            let (lon, lat) = (position[0], position[1]);
            (lon.is_finite() && lat.is_finite()).then_some((lon, lat))
        }
        _ => None,
    }
}

/// Creates a feature from a geometry value and properties.
pub fn new_feature(value: Value, properties: Option<JsonObject>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties,
        foreign_members: None,
    }
}

/// Creates a point feature at `(lon, lat)` without properties.
pub fn point_feature(lon: f64, lat: f64) -> Feature {
    new_feature(Value::Point(vec![lon, lat]), None)
}

/// Iterates over all `(lon, lat)` pairs of a geometry value.
pub fn positions(value: &Value) -> Box<dyn Iterator<Item = (f64, f64)> + '_> {
    fn pair(position: &Vec<f64>) -> Option<(f64, f64)> {
        (position.len() >= 2).then(|| (position[0], position[1]))
    }

    match value {
        Value::Point(position) => Box::new(pair(position).into_iter()),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            Box::new(positions.iter().filter_map(pair))
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            Box::new(lines.iter().flatten().filter_map(pair))
        }
        Value::MultiPolygon(polygons) => {
            Box::new(polygons.iter().flatten().flatten().filter_map(pair))
        }
        Value::GeometryCollection(geometries) => {
            Box::new(geometries.iter().flat_map(|g| positions(&g.value)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_coordinates() {
        assert_eq!(point_lonlat(&point_feature(34.78, 32.08)), Some((34.78, 32.08)));
        assert_eq!(point_lonlat(&point_feature(f64::NAN, 32.08)), None);
        assert_eq!(
            point_lonlat(&new_feature(Value::LineString(vec![vec![34.0, 32.0]]), None)),
            None
        );
    }

    #[test]
    fn positions_of_nested_geometries() {
        let value = Value::MultiPolygon(vec![
            vec![vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![0.0, 0.0]]],
            vec![vec![vec![5.0, 5.0], vec![6.0]]],
        ]);

        let all: Vec<_> = positions(&value).collect();
        assert_eq!(all, vec![(0.0, 0.0), (1.0, 0.0), (0.0, 0.0), (5.0, 5.0)]);
    }
}
