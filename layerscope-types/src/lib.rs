//! Geometry primitives used by the `layerscope` layer engine.
//!
//! The crate provides geographic points ([`geo::GeoPoint`]), geographic bounding boxes
//! ([`geo::GeoBoundingBox`]), projected points ([`cartesian::Point2d`]) and conversions between the
//! regional projected grid and geographic coordinates (see [`geo::Projection`]).

pub mod cartesian;
pub mod error;
pub mod geo;
