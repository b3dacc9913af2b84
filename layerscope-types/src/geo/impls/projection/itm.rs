use crate::cartesian::{NewCartesianPoint2d, Point2d};
use crate::geo::datum::Datum;
use crate::geo::impls::point::GeoPoint2d;
use crate::geo::impls::projection::geocentric::GeocentricShift;
use crate::geo::impls::projection::transverse_mercator::TransverseMercator;
use crate::geo::traits::point::{GeoPoint, NewGeoPoint};
use crate::geo::traits::projection::Projection;
use std::marker::PhantomData;

const LAT_0: f64 = 31.7343936111111;
const LON_0: f64 = 35.2045169444444;
const SCALE: f64 = 1.0000067;
const FALSE_EASTING: f64 = 219529.584;
const FALSE_NORTHING: f64 = 626907.39;
const TO_WGS84: [f64; 3] = [-48.0, 55.0, 52.0];

/// Israeli Transverse Mercator grid.
///
/// Geographic points on the input side are WGS84. The grid itself is defined on GRS80 and shifted into WGS84 with a
/// geocentric translation.
#[derive(Debug, Copy, Clone)]
pub struct Itm<In, Out> {
    grid: TransverseMercator<GeoPoint2d, Point2d>,
    shift: GeocentricShift,
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> Itm<In, Out> {
    /// Creates the projection.
    pub fn new() -> Self {
        Self {
            grid: TransverseMercator::new(
                Datum::GRS80,
                LAT_0,
                LON_0,
                SCALE,
                FALSE_EASTING,
                FALSE_NORTHING,
            ),
            shift: GeocentricShift::new(
                Datum::GRS80,
                Datum::WGS84,
                TO_WGS84[0],
                TO_WGS84[1],
                TO_WGS84[2],
            ),
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        }
    }
}

impl<In, Out> Default for Itm<In, Out> {
    fn default() -> Self {
        Self::new()
    }
}

impl<In: NewGeoPoint<f64>, Out: NewCartesianPoint2d<f64>> Projection for Itm<In, Out> {
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        let (lat, lon) = self.shift.reverse(input.lat(), input.lon());
        let projected = self.grid.project(&GeoPoint2d::latlon(lat, lon))?;

        Some(Out::new(projected.x, projected.y))
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        let local = self.grid.unproject(&Point2d::new(input.x(), input.y()))?;
        let (lat, lon) = self.shift.apply(local.lat(), local.lon());

        if lat.is_finite() && lon.is_finite() {
            Some(In::latlon(lat, lon))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unproject_known_points() {
        let itm: Itm<GeoPoint2d, Point2d> = Itm::new();

        let origin = itm
            .unproject(&Point2d::new(FALSE_EASTING, FALSE_NORTHING))
            .expect("finite");
        assert_abs_diff_eq!(origin.lat(), 31.734828, epsilon = 1e-5);
        assert_abs_diff_eq!(origin.lon(), 35.205283, epsilon = 1e-5);

        let tel_aviv = itm
            .unproject(&Point2d::new(178000.0, 664000.0))
            .expect("finite");
        assert_abs_diff_eq!(tel_aviv.lat(), 32.068578, epsilon = 1e-5);
        assert_abs_diff_eq!(tel_aviv.lon(), 34.765466, epsilon = 1e-5);
    }

    #[test]
    fn round_trip() {
        let itm: Itm<GeoPoint2d, Point2d> = Itm::new();
        let point = Point2d::new(180000.0, 665000.0);
        let geo = itm.unproject(&point).expect("finite");
        let back = itm.project(&geo).expect("finite");

        assert_abs_diff_eq!(back.x, point.x, epsilon = 0.05);
        assert_abs_diff_eq!(back.y, point.y, epsilon = 0.05);
    }
}
