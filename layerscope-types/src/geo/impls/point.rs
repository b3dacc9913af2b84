use crate::geo::traits::point::{GeoPoint, NewGeoPoint};
use serde::{Deserialize, Serialize};

/// 2d point on the surface of the Earth.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint for GeoPoint2d {
    type Num = f64;

    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl NewGeoPoint<f64> for GeoPoint2d {
    fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl GeoPoint2d {
    /// Returns `[lon, lat]`, the order used by GeoJSON positions.
    pub fn to_lonlat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Creates a new GeoPoint2d from latitude and longitude values (in degrees).
///
/// ```
/// use layerscope_types::geo::GeoPoint;
/// use layerscope_types::latlon;
///
/// let point = latlon!(32.08, 34.78);
/// assert_eq!(point.lat(), 32.08);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        <$crate::geo::impls::GeoPoint2d as $crate::geo::NewGeoPoint<f64>>::latlon($lat, $lon)
    };
}
