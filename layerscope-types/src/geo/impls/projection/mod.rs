//! Implementations of the projections used to bring local data into geographic coordinates.
mod geocentric;
mod itm;
mod transverse_mercator;

pub use geocentric::GeocentricShift;
pub use itm::Itm;
pub use transverse_mercator::TransverseMercator;

#[cfg(feature = "geodesy")]
mod geodesy;
#[cfg(feature = "geodesy")]
pub use geodesy::GeodesyProjection;
