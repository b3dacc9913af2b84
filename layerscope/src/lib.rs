//! Layerscope is a geospatial layer engine. It takes GeoJSON feature collections, brings their
//! coordinates to WGS84 and computes what a map view needs to present them: density grids,
//! overlap rings for coincident points, centroid reductions and duplicate-aware merges.
//!
//! # Quick start
//!
//! ```
//! use geojson::FeatureCollection;
//! use layerscope::feature::point_feature;
//! use layerscope::layer::{GridConfig, Layer};
//! use layerscope::layerscope_types::geo::GeoBoundingBox;
//! use layerscope::normalize::CoordinateNormalizer;
//!
//! let mut features = FeatureCollection {
//!     bbox: None,
//!     // One point in ITM meters, one in degrees
//!     features: vec![point_feature(178000.0, 664000.0), point_feature(34.78, 32.08)],
//!     foreign_members: None,
//! };
//! CoordinateNormalizer::heuristic().normalize_collection(&mut features);
//!
//! let layer = Layer::new("stations", features).with_grid(GridConfig {
//!     enabled: true,
//!     ..Default::default()
//! });
//!
//! let bbox = GeoBoundingBox::new(34.0, 31.0, 36.0, 33.0);
//! let grid = layer.grid_overlay(&bbox).unwrap().unwrap();
//! assert_eq!(grid.total_count(), 2);
//! ```
//!
//! # Main components
//!
//! * [`normalize`] converts Israeli Transverse Mercator (or any other supported projected system)
//!   coordinates into `[lon, lat]`.
//! * [`Layer`](layer::Layer) owns a normalized collection together with its
//!   [style](layer::LayerStyle) and [grid settings](layer::GridConfig). Layers are kept in a
//!   [`LayerCollection`](layer::LayerCollection).
//! * [`grid`] counts point features per cell of a square grid over the visible bounds.
//! * [`rings`] assigns concentric ring indices to points sharing a location and resolves their
//!   appearance, including the urgent highlight.
//! * [`centroid`] and [`merge`] derive new collections from existing ones.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod centroid;
mod color;
pub mod error;
pub mod feature;
pub mod grid;
pub mod layer;
pub mod merge;
pub mod normalize;
pub mod properties;
pub mod rings;

pub use color::Color;
pub use error::EngineError;
pub use layer::{Layer, LayerCollection};

// Reexport layerscope_types
pub use layerscope_types;
