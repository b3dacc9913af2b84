//! Normalization of incoming coordinates into geographic degrees.
//!
//! Every geometry must pass through a [`CoordinateNormalizer`] before it reaches any other engine
//! operation. By default the source coordinate system is guessed per coordinate pair (see
//! [`normalize`]); ingestion paths that know their source system should declare it with
//! [`SourceCrs`] instead.

use std::ops::RangeInclusive;

use geojson::{FeatureCollection, Geometry, Position, Value};
use layerscope_types::cartesian::Point2d;
use layerscope_types::geo::impls::projection::{GeodesyProjection, Itm};
use layerscope_types::geo::impls::GeoPoint2d;
use layerscope_types::geo::{GeoPoint, Projection};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Longitudes considered to be already geographic.
pub const GEOGRAPHIC_LON_RANGE: RangeInclusive<f64> = 34.0..=36.0;
/// Latitudes considered to be already geographic.
pub const GEOGRAPHIC_LAT_RANGE: RangeInclusive<f64> = 29.0..=34.0;

/// Converts a coordinate pair into `[lon, lat]` degrees.
///
/// Pairs with `x` in [`GEOGRAPHIC_LON_RANGE`] and `y` in [`GEOGRAPHIC_LAT_RANGE`] are returned
/// unchanged. Everything else is treated as an Israeli Transverse Mercator coordinate and
/// inverse-projected.
///
/// A projected system whose values happen to fall into the geographic window is silently passed
/// through. The function never fails.
pub fn normalize(x: f64, y: f64) -> [f64; 2] {
    if is_geographic(x, y) {
        return [x, y];
    }

    unproject_itm(&Itm::new(), x, y)
}

/// Returns true if the pair falls into the geographic window of the heuristic.
pub fn is_geographic(x: f64, y: f64) -> bool {
    GEOGRAPHIC_LON_RANGE.contains(&x) && GEOGRAPHIC_LAT_RANGE.contains(&y)
}

fn unproject_itm(itm: &Itm<GeoPoint2d, Point2d>, x: f64, y: f64) -> [f64; 2] {
    match itm.unproject(&Point2d::new(x, y)) {
        Some(point) => point.to_lonlat(),
        None => {
            trace!("Cannot unproject ({x}, {y}) from the Israeli grid, keeping it as is");
            [x, y]
        }
    }
}

/// Coordinate system of incoming data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceCrs {
    /// Decide per coordinate pair (see [`normalize`]).
    #[default]
    Auto,
    /// Already longitude/latitude in degrees.
    Geographic,
    /// Israeli Transverse Mercator.
    Itm,
    /// Any projection given as a `geodesy` operator definition, e.g. `"utm zone=36"`.
    Custom(String),
}

enum Conversion {
    Auto(Itm<GeoPoint2d, Point2d>),
    Geographic,
    Itm(Itm<GeoPoint2d, Point2d>),
    Custom(GeodesyProjection<GeoPoint2d, Point2d>),
}

/// Brings geometries into geographic coordinates.
pub struct CoordinateNormalizer {
    source: SourceCrs,
    conversion: Conversion,
}

impl CoordinateNormalizer {
    /// Creates a normalizer for the given source system.
    ///
    /// Fails only for [`SourceCrs::Custom`] definitions that cannot be parsed.
    pub fn new(source: SourceCrs) -> Result<Self, EngineError> {
        let conversion = match &source {
            SourceCrs::Auto => Conversion::Auto(Itm::new()),
            SourceCrs::Geographic => Conversion::Geographic,
            SourceCrs::Itm => Conversion::Itm(Itm::new()),
            SourceCrs::Custom(definition) => {
                Conversion::Custom(GeodesyProjection::new(definition)?)
            }
        };

        Ok(Self { source, conversion })
    }

    /// Normalizer using the range heuristic.
    pub fn heuristic() -> Self {
        Self {
            source: SourceCrs::Auto,
            conversion: Conversion::Auto(Itm::new()),
        }
    }

    /// Source system of the normalizer.
    pub fn source(&self) -> &SourceCrs {
        &self.source
    }

    /// Converts a single pair into `[lon, lat]`.
    pub fn normalize(&self, x: f64, y: f64) -> [f64; 2] {
        match &self.conversion {
            Conversion::Auto(itm) => {
                if is_geographic(x, y) {
                    [x, y]
                } else {
                    unproject_itm(itm, x, y)
                }
            }
            Conversion::Geographic => [x, y],
            Conversion::Itm(itm) => unproject_itm(itm, x, y),
            Conversion::Custom(projection) => match projection.unproject(&Point2d::new(x, y)) {
                Some(point) => [point.lon(), point.lat()],
                None => {
                    trace!(
                        "Cannot unproject ({x}, {y}) with '{}', keeping it as is",
                        projection.definition()
                    );
                    [x, y]
                }
            },
        }
    }

    /// Normalizes a GeoJSON position in place. Positions with less than two ordinates are left
    /// untouched, ordinates after the second one are kept.
    pub fn normalize_position(&self, position: &mut Position) {
        if position.len() < 2 {
            return;
        }

        let [lon, lat] = self.normalize(position[0], position[1]);
        position[0] = lon;
        position[1] = lat;
    }

    /// Normalizes every position of the geometry in place. The geometry's bounding box is dropped
    /// since it no longer matches the coordinates.
    pub fn normalize_geometry(&self, geometry: &mut Geometry) {
        geometry.bbox = None;
        self.normalize_value(&mut geometry.value);
    }

    fn normalize_value(&self, value: &mut Value) {
        match value {
            Value::Point(position) => self.normalize_position(position),
            Value::MultiPoint(positions) | Value::LineString(positions) => {
                positions.iter_mut().for_each(|p| self.normalize_position(p))
            }
            Value::MultiLineString(lines) | Value::Polygon(lines) => lines
                .iter_mut()
                .flatten()
                .for_each(|p| self.normalize_position(p)),
            Value::MultiPolygon(polygons) => polygons
                .iter_mut()
                .flatten()
                .flatten()
                .for_each(|p| self.normalize_position(p)),
            Value::GeometryCollection(geometries) => geometries
                .iter_mut()
                .for_each(|g| self.normalize_geometry(g)),
        }
    }

    /// Normalizes all features of the collection in place.
    pub fn normalize_collection(&self, collection: &mut FeatureCollection) {
        collection.bbox = None;
        for feature in &mut collection.features {
            feature.bbox = None;
            if let Some(geometry) = feature.geometry.as_mut() {
                self.normalize_geometry(geometry);
            }
        }
    }
}

impl Default for CoordinateNormalizer {
    fn default() -> Self {
        Self::heuristic()
    }
}

impl std::fmt::Debug for CoordinateNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinateNormalizer")
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use assert_matches::assert_matches;
    use geojson::Feature;

    #[test]
    fn geographic_window_is_identity() {
        for x in [34.0, 34.5, 34.78, 35.2, 36.0] {
            for y in [29.0, 30.1, 32.08, 33.999, 34.0] {
                assert_eq!(normalize(x, y), [x, y]);
            }
        }
    }

    #[test]
    fn projected_pairs_are_unprojected() {
        let [lon, lat] = normalize(178000.0, 664000.0);

        assert_abs_diff_eq!(lat, 32.068578, epsilon = 1e-5);
        assert_abs_diff_eq!(lon, 34.765466, epsilon = 1e-5);
    }

    #[test]
    fn pairs_just_outside_the_window_are_projected() {
        let [lon, lat] = normalize(36.5, 32.0);
        assert_ne!([lon, lat], [36.5, 32.0]);
    }

    #[test]
    fn explicit_source_systems() {
        let geographic = CoordinateNormalizer::new(SourceCrs::Geographic).unwrap();
        assert_eq!(geographic.normalize(178000.0, 664000.0), [178000.0, 664000.0]);

        let itm = CoordinateNormalizer::new(SourceCrs::Itm).unwrap();
        assert_eq!(
            itm.normalize(178000.0, 664000.0),
            normalize(178000.0, 664000.0)
        );
        assert_ne!(itm.normalize(35.0, 32.0), [35.0, 32.0]);
    }

    #[test]
    fn custom_source_system() {
        let normalizer =
            CoordinateNormalizer::new(SourceCrs::Custom("utm zone=36".into())).unwrap();
        let [lon, lat] = normalizer.normalize(500000.0, 3_500_000.0);

        assert_abs_diff_eq!(lon, 33.0, epsilon = 1e-6);
        assert!(lat > 31.0 && lat < 32.0);

        assert_matches!(
            CoordinateNormalizer::new(SourceCrs::Custom("no_such_operator".into())),
            Err(EngineError::UnknownCrs(_))
        );
    }

    #[test]
    fn geometry_normalization_keeps_elevation() {
        let normalizer = CoordinateNormalizer::default();
        let mut geometry = Geometry::new(Value::LineString(vec![
            vec![34.78, 32.08, 12.0],
            vec![178000.0, 664000.0],
            vec![1.0],
        ]));
        normalizer.normalize_geometry(&mut geometry);

        let Value::LineString(positions) = &geometry.value else {
            panic!("geometry type changed");
        };
        assert_eq!(positions[0], vec![34.78, 32.08, 12.0]);
        assert_abs_diff_eq!(positions[1][0], 34.765466, epsilon = 1e-5);
        assert_eq!(positions[2], vec![1.0]);
    }

    #[test]
    fn collection_normalization() {
        let mut collection = FeatureCollection {
            bbox: Some(vec![0.0, 0.0, 1.0, 1.0]),
            features: vec![Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Polygon(vec![vec![
                    vec![178000.0, 664000.0],
                    vec![179000.0, 664000.0],
                    vec![179000.0, 665000.0],
                    vec![178000.0, 664000.0],
                ]]))),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            foreign_members: None,
        };

        CoordinateNormalizer::default().normalize_collection(&mut collection);

        assert!(collection.bbox.is_none());
        let Some(Value::Polygon(rings)) = collection.features[0].geometry.as_ref().map(|g| &g.value)
        else {
            panic!("geometry type changed");
        };
        assert!(rings[0]
            .iter()
            .all(|p| is_geographic(p[0], p[1])));
    }
}
