//! Concatenation of two feature collections with duplicate removal.

use std::hash::{BuildHasher, Hasher};

use ahash::{HashMap, HashMapExt, RandomState};
use geojson::{Feature, FeatureCollection, Value};
use log::debug;

use crate::properties::committed_eq;

/// Result of [`merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// Destination features followed by the source features that are not duplicates.
    pub merged: FeatureCollection,
    /// Number of source features dropped as duplicates.
    pub duplicates_removed: usize,
}

/// Appends the features of `source` to `destination`, dropping source features that duplicate a
/// feature already in the result.
///
/// Two features are duplicates if their geometries have the same type and exactly the same
/// coordinates, and their committed properties are equal (transient `_` keys and feature ids are
/// not compared). Destination features are never dropped, so merging a collection with a copy of
/// itself gives the original collection and reports every source feature as a duplicate.
pub fn merge(destination: &FeatureCollection, source: &FeatureCollection) -> MergeOutcome {
    let state = RandomState::new();
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut merged = Vec::with_capacity(destination.features.len() + source.features.len());

    for feature in &destination.features {
        buckets
            .entry(geometry_hash(&state, feature))
            .or_default()
            .push(merged.len());
        merged.push(feature.clone());
    }

    let mut duplicates_removed = 0;
    for feature in &source.features {
        let bucket = buckets.entry(geometry_hash(&state, feature)).or_default();
        if bucket
            .iter()
            .any(|&index| is_duplicate(&merged[index], feature))
        {
            duplicates_removed += 1;
            continue;
        }

        bucket.push(merged.len());
        merged.push(feature.clone());
    }

    debug!(
        "Merged {} + {} features, {duplicates_removed} duplicates removed",
        destination.features.len(),
        source.features.len()
    );

    MergeOutcome {
        merged: FeatureCollection {
            bbox: None,
            features: merged,
            foreign_members: destination.foreign_members.clone(),
        },
        duplicates_removed,
    }
}

/// Returns true if the features have equal geometry values and equal committed properties.
///
/// Coordinates are compared by their bit patterns, except that `0.0` equals `-0.0`. A feature with
/// a `NaN` ordinate is therefore a duplicate of its own copy.
pub fn is_duplicate(a: &Feature, b: &Feature) -> bool {
    let same_geometry = match (&a.geometry, &b.geometry) {
        (Some(a), Some(b)) => same_value(&a.value, &b.value),
        (None, None) => true,
        _ => false,
    };

    same_geometry && committed_eq(a.properties.as_ref(), b.properties.as_ref())
}

fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Point(a), Value::Point(b)) => same_position(a, b),
        (Value::MultiPoint(a), Value::MultiPoint(b))
        | (Value::LineString(a), Value::LineString(b)) => same_positions(a, b),
        (Value::MultiLineString(a), Value::MultiLineString(b))
        | (Value::Polygon(a), Value::Polygon(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_positions(a, b))
        }
        (Value::MultiPolygon(a), Value::MultiPolygon(b)) => {
            a.len() == b.len()
                && a.iter().zip(b).all(|(a, b)| {
                    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_positions(a, b))
                })
        }
        (Value::GeometryCollection(a), Value::GeometryCollection(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_value(&a.value, &b.value))
        }
        _ => false,
    }
}

fn same_positions(a: &[Vec<f64>], b: &[Vec<f64>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| same_position(a, b))
}

fn same_position(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(a, b)| ordinate_bits(*a) == ordinate_bits(*b))
}

/// Bit pattern of an ordinate with both zeros mapped to the same value.
fn ordinate_bits(ordinate: f64) -> u64 {
    if ordinate == 0.0 {
        0
    } else {
        ordinate.to_bits()
    }
}

fn geometry_hash(state: &RandomState, feature: &Feature) -> u64 {
    let mut hasher = state.build_hasher();
    match &feature.geometry {
        Some(geometry) => hash_value(&mut hasher, &geometry.value),
        None => hasher.write_u8(u8::MAX),
    }
    hasher.finish()
}

fn hash_value(hasher: &mut impl Hasher, value: &Value) {
    match value {
        Value::Point(position) => {
            hasher.write_u8(0);
            hash_positions(hasher, std::slice::from_ref(position));
        }
        Value::MultiPoint(positions) => {
            hasher.write_u8(1);
            hash_positions(hasher, positions);
        }
        Value::LineString(positions) => {
            hasher.write_u8(2);
            hash_positions(hasher, positions);
        }
        Value::MultiLineString(lines) => {
            hasher.write_u8(3);
            lines.iter().for_each(|line| hash_positions(hasher, line));
        }
        Value::Polygon(rings) => {
            hasher.write_u8(4);
            rings.iter().for_each(|ring| hash_positions(hasher, ring));
        }
        Value::MultiPolygon(polygons) => {
            hasher.write_u8(5);
            polygons
                .iter()
                .flatten()
                .for_each(|ring| hash_positions(hasher, ring));
        }
        Value::GeometryCollection(geometries) => {
            hasher.write_u8(6);
            geometries
                .iter()
                .for_each(|geometry| hash_value(hasher, &geometry.value));
        }
    }
}

fn hash_positions(hasher: &mut impl Hasher, positions: &[Vec<f64>]) {
    hasher.write_usize(positions.len());
    for position in positions {
        hasher.write_usize(position.len());
        position
            .iter()
            .for_each(|ordinate| hasher.write_u64(ordinate_bits(*ordinate)));
    }
}
