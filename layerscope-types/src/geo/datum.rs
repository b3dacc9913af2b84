/// Reference ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    semimajor: f64,
    inv_flattening: f64,
}

impl Datum {
    /// World Geodetic System 1984.
    pub const WGS84: Self = Datum {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257223563,
    };

    /// Geodetic Reference System 1980, the ellipsoid of the Israeli grid.
    pub const GRS80: Self = Datum {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257222101,
    };

    /// Semi-major axis in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Flattening `f`.
    pub fn flattening(&self) -> f64 {
        1.0 / self.inv_flattening
    }

    /// First eccentricity squared, `e² = f(2 - f)`.
    pub fn eccentricity_sq(&self) -> f64 {
        let f = self.flattening();
        f * (2.0 - f)
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::WGS84
    }
}
