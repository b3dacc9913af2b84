use crate::geo::impls::GeoPoint2d;
use crate::geo::traits::point::{GeoPoint, NewGeoPoint};
use serde::{Deserialize, Serialize};

/// Rectangular area in geographic coordinates, given by its edges in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBoundingBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl GeoBoundingBox {
    /// Creates a new bounding box from its edges.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Western edge (minimum longitude).
    pub fn west(&self) -> f64 {
        self.west
    }

    /// Southern edge (minimum latitude).
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Eastern edge (maximum longitude).
    pub fn east(&self) -> f64 {
        self.east
    }

    /// Northern edge (maximum latitude).
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Extent in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Extent in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center of the box.
    pub fn center(&self) -> GeoPoint2d {
        GeoPoint2d::latlon(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Returns true if any of the edges is not a finite number, or the box has zero width or
    /// height.
    pub fn is_degenerate(&self) -> bool {
        let edges = [self.west, self.south, self.east, self.north];
        edges.iter().any(|v| !v.is_finite()) || self.width() == 0.0 || self.height() == 0.0
    }

    /// Returns true if the southern edge is north of the northern edge, or the western edge is
    /// east of the eastern one.
    pub fn is_inverted(&self) -> bool {
        self.south > self.north || self.west > self.east
    }

    /// Returns true if the point is inside the box or on its edge.
    pub fn contains(&self, point: &impl GeoPoint<Num = f64>) -> bool {
        self.west <= point.lon()
            && self.east >= point.lon()
            && self.south <= point.lat()
            && self.north >= point.lat()
    }

    /// Creates the smallest box containing all the given `(lon, lat)` pairs. Returns `None` if
    /// the iterator is empty.
    pub fn from_lonlat(mut positions: impl Iterator<Item = (f64, f64)>) -> Option<Self> {
        let (lon, lat) = positions.next()?;
        let mut bbox = Self::new(lon, lat, lon, lat);

        for (lon, lat) in positions {
            if bbox.west > lon {
                bbox.west = lon;
            }
            if bbox.south > lat {
                bbox.south = lat;
            }
            if bbox.east < lon {
                bbox.east = lon;
            }
            if bbox.north < lat {
                bbox.north = lat;
            }
        }

        Some(bbox)
    }

    /// Returns the ring of corner positions `[lon, lat]` going counter-clockwise from the
    /// south-western corner, closed by repeating the first corner.
    pub fn into_ring(self) -> Vec<Vec<f64>> {
        vec![
            vec![self.west, self.south],
            vec![self.east, self.south],
            vec![self.east, self.north],
            vec![self.west, self.north],
            vec![self.west, self.south],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::latlon;

    #[test]
    fn degenerate_boxes() {
        assert!(GeoBoundingBox::new(34.0, 32.0, 34.0, 33.0).is_degenerate());
        assert!(GeoBoundingBox::new(34.0, 32.0, 35.0, f64::NAN).is_degenerate());
        assert!(!GeoBoundingBox::new(34.0, 32.0, 35.0, 33.0).is_degenerate());
    }

    #[test]
    fn inverted_boxes() {
        assert!(GeoBoundingBox::new(34.0, 33.0, 35.0, 32.0).is_inverted());
        assert!(GeoBoundingBox::new(35.0, 32.0, 34.0, 33.0).is_inverted());
        assert!(!GeoBoundingBox::new(34.0, 32.0, 35.0, 33.0).is_inverted());
    }

    #[test]
    fn from_positions() {
        let bbox = GeoBoundingBox::from_lonlat(
            [(34.78, 32.08), (35.0, 32.5), (34.5, 31.9)].into_iter(),
        )
        .expect("not empty");

        assert_eq!(bbox, GeoBoundingBox::new(34.5, 31.9, 35.0, 32.5));
        assert!(bbox.contains(&latlon!(32.08, 34.78)));
        assert!(!bbox.contains(&latlon!(33.0, 34.78)));
        assert!(GeoBoundingBox::from_lonlat(std::iter::empty()).is_none());
    }

    #[test]
    fn ring_is_closed() {
        let ring = GeoBoundingBox::new(34.0, 32.0, 35.0, 33.0).into_ring();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring[0], ring[4]);
    }
}
