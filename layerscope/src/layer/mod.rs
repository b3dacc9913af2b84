//! [Layers](Layer) own a feature collection together with its display and grid settings.

use std::sync::atomic::{AtomicU64, Ordering};

use geojson::{Feature, FeatureCollection, Value};
use layerscope_types::geo::GeoBoundingBox;
use web_time::{Duration, SystemTime};

use crate::centroid::reduce_to_points;
use crate::error::EngineError;
use crate::feature::positions;
use crate::grid::{aggregate, GridAggregation};
use crate::merge::merge;
use crate::properties::commit_collection;
use crate::rings::{next_refresh, resolve_appearance, PointAppearance};

mod layer_collection;
mod style;

pub use layer_collection::LayerCollection;
pub use style::{GridConfig, LayerStyle};

/// Unique identifier of a layer instance.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub struct LayerId(u64);

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

impl LayerId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Kind of geometries a layer holds. Used to pick the default styling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GeometryFamily {
    /// The layer has no geometries.
    Empty,
    /// Points and multipoints.
    Point,
    /// Line strings and multi line strings.
    Line,
    /// Polygons and multipolygons.
    Polygon,
    /// Geometries of different families, or geometry collections.
    Mixed,
}

impl GeometryFamily {
    /// Family of a single geometry.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Point(_) | Value::MultiPoint(_) => Self::Point,
            Value::LineString(_) | Value::MultiLineString(_) => Self::Line,
            Value::Polygon(_) | Value::MultiPolygon(_) => Self::Polygon,
            Value::GeometryCollection(_) => Self::Mixed,
        }
    }

    /// Common family of all geometries of the collection. Features without geometry are ignored.
    pub fn detect(collection: &FeatureCollection) -> Self {
        collection
            .features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .map(|geometry| Self::of_value(&geometry.value))
            .fold(Self::Empty, |acc, family| match acc {
                Self::Empty => family,
                acc if acc == family => acc,
                _ => Self::Mixed,
            })
    }
}

/// A named, styled feature collection.
///
/// Every change of the features increments the layer [revision](Layer::revision), which together
/// with the [id](Layer::id) identifies the exact content of the layer for memoization.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    features: FeatureCollection,
    style: LayerStyle,
    family: GeometryFamily,
    grid: GridConfig,
    revision: u64,
}

impl Clone for Layer {
    fn clone(&self) -> Self {
        Self {
            id: LayerId::next(),
            name: self.name.clone(),
            features: self.features.clone(),
            style: self.style,
            family: self.family,
            grid: self.grid,
            revision: self.revision,
        }
    }
}

impl Layer {
    /// Creates a layer with default style and grid settings. The features must already be in
    /// geographic coordinates (see [`CoordinateNormalizer`](crate::normalize::CoordinateNormalizer)).
    pub fn new(name: impl Into<String>, features: FeatureCollection) -> Self {
        Self {
            id: LayerId::next(),
            name: name.into(),
            family: GeometryFamily::detect(&features),
            features,
            style: LayerStyle::default(),
            grid: GridConfig::default(),
            revision: 0,
        }
    }

    /// Creates a layer without features.
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(
            name,
            FeatureCollection {
                bbox: None,
                features: vec![],
                foreign_members: None,
            },
        )
    }

    /// Sets the style of the layer.
    pub fn with_style(mut self, style: LayerStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the grid settings of the layer.
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Unique id of this layer instance.
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Name of the layer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the layer.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Features of the layer.
    pub fn features(&self) -> &FeatureCollection {
        &self.features
    }

    /// Number of features in the layer.
    pub fn len(&self) -> usize {
        self.features.features.len()
    }

    /// Returns true if the layer has no features.
    pub fn is_empty(&self) -> bool {
        self.features.features.is_empty()
    }

    /// Modifies the features of the layer. The revision is incremented and the geometry family
    /// detected again.
    pub fn edit_features<R>(&mut self, edit: impl FnOnce(&mut FeatureCollection) -> R) -> R {
        let result = edit(&mut self.features);
        self.touch();
        result
    }

    /// Appends a feature to the layer.
    pub fn push_feature(&mut self, feature: Feature) {
        self.edit_features(|collection| collection.features.push(feature))
    }

    /// Replaces all features of the layer.
    pub fn replace_features(&mut self, features: FeatureCollection) {
        self.edit_features(|collection| *collection = features)
    }

    /// Strips transient properties from all features. Returns the number of removed keys.
    pub fn commit(&mut self) -> usize {
        self.edit_features(commit_collection)
    }

    fn touch(&mut self) {
        self.revision += 1;
        self.family = GeometryFamily::detect(&self.features);
    }

    /// Revision of the features, incremented on every change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Geometry family of the features.
    pub fn family(&self) -> GeometryFamily {
        self.family
    }

    /// Display attributes.
    pub fn style(&self) -> &LayerStyle {
        &self.style
    }

    /// Mutable display attributes.
    pub fn style_mut(&mut self) -> &mut LayerStyle {
        &mut self.style
    }

    /// Grid settings.
    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// Mutable grid settings.
    pub fn grid_mut(&mut self) -> &mut GridConfig {
        &mut self.grid
    }

    /// Bounding box of all feature geometries, `None` for a layer without coordinates.
    pub fn bounds(&self) -> Option<GeoBoundingBox> {
        collection_bounds(&self.features)
    }

    /// Density grid of the layer points inside `bbox`, using the layer grid settings. Returns
    /// `None` if the grid is disabled for the layer.
    pub fn grid_overlay(
        &self,
        bbox: &GeoBoundingBox,
    ) -> Result<Option<GridAggregation>, EngineError> {
        if !self.grid.enabled {
            return Ok(None);
        }

        aggregate(
            &self.features.features,
            bbox,
            self.grid.cell_size_km,
            self.grid.show_labels,
        )
        .map(Some)
    }

    /// Appearance of every point feature at the time `now`, `None` for other geometries.
    pub fn point_appearance(&self, now: SystemTime) -> Vec<Option<PointAppearance>> {
        resolve_appearance(&self.features.features, &self.style, now)
    }

    /// Time after which the point appearance must be resolved again because a highlight pulse
    /// ends. `None` if no feature is pulsing.
    pub fn next_refresh(&self, now: SystemTime) -> Option<Duration> {
        next_refresh(&self.features.features, now)
    }

    /// Appends the features of `other` that are not duplicates of this layer's features. Returns
    /// the number of dropped duplicates.
    pub fn merge_from(&mut self, other: &Layer) -> usize {
        let outcome = merge(&self.features, &other.features);
        self.replace_features(outcome.merged);
        outcome.duplicates_removed
    }

    /// Creates a new point layer with one point per polygon of this layer. The new layer inherits
    /// the style and grid settings.
    pub fn to_centroid_layer(&self, name: impl Into<String>) -> Layer {
        Layer::new(name, reduce_to_points(&self.features))
            .with_style(self.style)
            .with_grid(self.grid)
    }
}

/// Bounding box of all positions of the collection, `None` if it has no positions.
pub fn collection_bounds(collection: &FeatureCollection) -> Option<GeoBoundingBox> {
    GeoBoundingBox::from_lonlat(
        collection
            .features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .flat_map(|geometry| positions(&geometry.value)),
    )
}
