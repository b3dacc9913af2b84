//! Geometries in geographic coordinates (latitude and longitude) (see [`GeoPoint`]) and conversion between the
//! regional projected grid and geographic coordinates (see [`Projection`]).

mod bounding_box;
mod datum;
pub mod impls;
mod traits;

pub use bounding_box::GeoBoundingBox;
pub use datum::Datum;
pub use traits::point::{GeoPoint, NewGeoPoint};
pub use traits::projection::Projection;
