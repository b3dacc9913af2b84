use crate::cartesian::NewCartesianPoint2d;
use crate::geo::datum::Datum;
use crate::geo::traits::point::NewGeoPoint;
use crate::geo::traits::projection::Projection;
use std::marker::PhantomData;

/// Transverse mercator projection on an ellipsoid.
///
/// Uses the series expansion from Snyder's "Map Projections - A Working Manual", which is accurate to millimeters
/// within a few hundred kilometers of the central meridian.
#[derive(Debug, Copy, Clone)]
pub struct TransverseMercator<In, Out> {
    datum: Datum,
    lat_0: f64,
    lon_0: f64,
    k_0: f64,
    false_easting: f64,
    false_northing: f64,
    phantom_in: PhantomData<In>,
    phantom_out: PhantomData<Out>,
}

impl<In, Out> TransverseMercator<In, Out> {
    /// Creates a new projection. `lat_0` and `lon_0` are the latitude of origin and the central meridian in degrees,
    /// `k_0` is the scale factor on the central meridian.
    pub fn new(
        datum: Datum,
        lat_0: f64,
        lon_0: f64,
        k_0: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> Self {
        Self {
            datum,
            lat_0: lat_0.to_radians(),
            lon_0: lon_0.to_radians(),
            k_0,
            false_easting,
            false_northing,
            phantom_in: Default::default(),
            phantom_out: Default::default(),
        }
    }

    /// Meridian arc length from the equator to the latitude `phi` (radians).
    fn meridian_arc(&self, phi: f64) -> f64 {
        let e2 = self.datum.eccentricity_sq();
        let e4 = e2 * e2;
        let e6 = e4 * e2;

        self.datum.semimajor()
            * ((1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0) * phi
                - (3.0 * e2 / 8.0 + 3.0 * e4 / 32.0 + 45.0 * e6 / 1024.0) * (2.0 * phi).sin()
                + (15.0 * e4 / 256.0 + 45.0 * e6 / 1024.0) * (4.0 * phi).sin()
                - (35.0 * e6 / 3072.0) * (6.0 * phi).sin())
    }

    /// Forward projection of `(lat, lon)` in radians into `(x, y)` in meters.
    fn forward(&self, phi: f64, lambda: f64) -> (f64, f64) {
        let a = self.datum.semimajor();
        let e2 = self.datum.eccentricity_sq();
        let ep2 = e2 / (1.0 - e2);

        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = a / (1.0 - e2 * sin_phi * sin_phi).sqrt();
        let t = tan_phi * tan_phi;
        let c = ep2 * cos_phi * cos_phi;
        let big_a = (lambda - self.lon_0) * cos_phi;

        let x = self.k_0
            * n
            * (big_a
                + (1.0 - t + c) * big_a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t * t + 72.0 * c - 58.0 * ep2) * big_a.powi(5) / 120.0);
        let y = self.k_0
            * (self.meridian_arc(phi) - self.meridian_arc(self.lat_0)
                + n * tan_phi
                    * (big_a * big_a / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c * c) * big_a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t * t + 600.0 * c - 330.0 * ep2) * big_a.powi(6)
                            / 720.0));

        (x + self.false_easting, y + self.false_northing)
    }

    /// Inverse projection of `(x, y)` in meters into `(lat, lon)` in radians.
    fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let a = self.datum.semimajor();
        let e2 = self.datum.eccentricity_sq();
        let e4 = e2 * e2;
        let e6 = e4 * e2;
        let ep2 = e2 / (1.0 - e2);

        let m = self.meridian_arc(self.lat_0) + (y - self.false_northing) / self.k_0;
        let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
        let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

        let phi_1 = mu
            + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
            + (21.0 * e1 * e1 / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
            + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
            + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

        let sin_phi_1 = phi_1.sin();
        let cos_phi_1 = phi_1.cos();
        let tan_phi_1 = phi_1.tan();

        let c1 = ep2 * cos_phi_1 * cos_phi_1;
        let t1 = tan_phi_1 * tan_phi_1;
        let w = 1.0 - e2 * sin_phi_1 * sin_phi_1;
        let n1 = a / w.sqrt();
        let r1 = a * (1.0 - e2) / w.powf(1.5);
        let d = (x - self.false_easting) / (n1 * self.k_0);

        let phi = phi_1
            - (n1 * tan_phi_1 / r1)
                * (d * d / 2.0
                    - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                    + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                        * d.powi(6)
                        / 720.0);
        let lambda = self.lon_0
            + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
                + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1)
                    * d.powi(5)
                    / 120.0)
                / cos_phi_1;

        (phi, lambda)
    }
}

impl<In: NewGeoPoint<f64>, Out: NewCartesianPoint2d<f64>> Projection
    for TransverseMercator<In, Out>
{
    type InPoint = In;
    type OutPoint = Out;

    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint> {
        let (x, y) = self.forward(input.lat_rad(), input.lon_rad());

        if x.is_finite() && y.is_finite() {
            Some(Self::OutPoint::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint> {
        let (phi, lambda) = self.inverse(input.x(), input.y());

        if phi.is_finite() && lambda.is_finite() {
            Some(Self::InPoint::latlon(phi.to_degrees(), lambda.to_degrees()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;
    use crate::geo::impls::GeoPoint2d;
    use crate::latlon;
    use approx::assert_abs_diff_eq;

    fn israeli_grid() -> TransverseMercator<GeoPoint2d, Point2d> {
        TransverseMercator::new(
            Datum::GRS80,
            31.7343936111111,
            35.2045169444444,
            1.0000067,
            219529.584,
            626907.39,
        )
    }

    #[test]
    fn origin_maps_to_false_coordinates() {
        let projection = israeli_grid();
        let projected = projection
            .project(&latlon!(31.7343936111111, 35.2045169444444))
            .expect("finite");

        assert_abs_diff_eq!(projected.x, 219529.584, epsilon = 0.001);
        assert_abs_diff_eq!(projected.y, 626907.39, epsilon = 0.001);
    }

    #[test]
    fn round_trip() {
        let projection = israeli_grid();
        let point = Point2d::new(178000.0, 664000.0);
        let geo = projection.unproject(&point).expect("finite");
        let back = projection.project(&geo).expect("finite");

        assert_abs_diff_eq!(back.x, point.x, epsilon = 0.01);
        assert_abs_diff_eq!(back.y, point.y, epsilon = 0.01);
    }
}
