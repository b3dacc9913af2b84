//! Reduction of polygon features to representative points.

use geojson::{Feature, FeatureCollection, Geometry, Position, Value};
use log::{debug, trace};

/// Replaces every polygon feature by a point at the vertex average of its outer ring.
///
/// For a `MultiPolygon` only the outer ring of the first polygon is used. The average is taken
/// over the positions as listed, so it is not an area-weighted centroid and is biased towards
/// densely sampled parts of the ring.
///
/// Properties and ids are copied unchanged. Features that are neither polygons nor multipolygons,
/// and polygons with an empty outer ring, are left out.
pub fn reduce_to_points(collection: &FeatureCollection) -> FeatureCollection {
    let features: Vec<Feature> = collection
        .features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| {
            let point = feature.geometry.as_ref().and_then(|g| centroid(&g.value));
            if point.is_none() {
                trace!("Feature {index} has no polygon outer ring, skipping");
            }

            Some(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Point(point?))),
                id: feature.id.clone(),
                properties: feature.properties.clone(),
                foreign_members: None,
            })
        })
        .collect();

    debug!(
        "Reduced {} features to {} points",
        collection.features.len(),
        features.len()
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// Vertex average of the polygon outer ring, or of the first polygon's outer ring for a
/// multipolygon. `None` for other geometries.
pub fn centroid(value: &Value) -> Option<Position> {
    let outer_ring = match value {
        Value::Polygon(rings) => rings.first()?,
        Value::MultiPolygon(polygons) => polygons.first()?.first()?,
        _ => return None,
    };

    vertex_average(outer_ring)
}

fn vertex_average(ring: &[Position]) -> Option<Position> {
    let vertices = ring.iter().filter(|p| p.len() >= 2);
    let (count, lon_sum, lat_sum) = vertices.fold((0usize, 0.0, 0.0), |(n, lon, lat), p| {
        (n + 1, lon + p[0], lat + p[1])
    });

    if count == 0 {
        return None;
    }

    Some(vec![lon_sum / count as f64, lat_sum / count as f64])
}
