use crate::geo::datum::Datum;

const MAX_ITERATIONS: usize = 10;

/// Three-parameter datum shift: translation of the earth-centered, earth-fixed cartesian coordinates.
///
/// `apply` converts coordinates given on the `from` ellipsoid into the `to` ellipsoid, `reverse` does the opposite.
/// Heights are assumed to be zero and are not returned.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeocentricShift {
    from: Datum,
    to: Datum,
    dx: f64,
    dy: f64,
    dz: f64,
}

impl GeocentricShift {
    /// Creates a new shift. Translation values are in meters.
    pub fn new(from: Datum, to: Datum, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            from,
            to,
            dx,
            dy,
            dz,
        }
    }

    /// Converts `(lat, lon)` in degrees from the source datum into the target datum.
    pub fn apply(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y, z) = to_geocentric(&self.from, lat, lon);
        from_geocentric(&self.to, x + self.dx, y + self.dy, z + self.dz)
    }

    /// Converts `(lat, lon)` in degrees from the target datum back into the source datum.
    pub fn reverse(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y, z) = to_geocentric(&self.to, lat, lon);
        from_geocentric(&self.from, x - self.dx, y - self.dy, z - self.dz)
    }
}

fn to_geocentric(datum: &Datum, lat: f64, lon: f64) -> (f64, f64, f64) {
    let e2 = datum.eccentricity_sq();
    let phi = lat.to_radians();
    let lambda = lon.to_radians();
    let n = datum.semimajor() / (1.0 - e2 * phi.sin() * phi.sin()).sqrt();

    (
        n * phi.cos() * lambda.cos(),
        n * phi.cos() * lambda.sin(),
        n * (1.0 - e2) * phi.sin(),
    )
}

fn from_geocentric(datum: &Datum, x: f64, y: f64, z: f64) -> (f64, f64) {
    let e2 = datum.eccentricity_sq();
    let lambda = y.atan2(x);
    let p = x.hypot(y);

    let mut phi = z.atan2(p * (1.0 - e2));
    for _ in 0..MAX_ITERATIONS {
        let n = datum.semimajor() / (1.0 - e2 * phi.sin() * phi.sin()).sqrt();
        let h = p / phi.cos() - n;
        phi = z.atan2(p * (1.0 - e2 * n / (n + h)));
    }

    (phi.to_degrees(), lambda.to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_shift_is_identity() {
        let shift = GeocentricShift::new(Datum::WGS84, Datum::WGS84, 0.0, 0.0, 0.0);
        let (lat, lon) = shift.apply(32.08, 34.78);

        assert_abs_diff_eq!(lat, 32.08, epsilon = 1e-9);
        assert_abs_diff_eq!(lon, 34.78, epsilon = 1e-9);
    }

    #[test]
    fn reverse_undoes_apply() {
        let shift = GeocentricShift::new(Datum::GRS80, Datum::WGS84, -48.0, 55.0, 52.0);
        let (lat, lon) = shift.apply(31.5, 35.1);
        let (back_lat, back_lon) = shift.reverse(lat, lon);

        assert!((lat - 31.5).abs() > 1e-5);
        assert_abs_diff_eq!(back_lat, 31.5, epsilon = 1e-7);
        assert_abs_diff_eq!(back_lon, 35.1, epsilon = 1e-7);
    }
}
