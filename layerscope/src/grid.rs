//! Density binning of point features into a regular grid.
//!
//! The grid is rebuilt from scratch on every [`aggregate`] call. Output size is bounded by
//! [`MAX_CELLS`] and [`MAX_LABEL_CELLS`]: large inputs give truncated results instead of
//! unbounded latency. Use [`GridMemo`] to skip rebinning when the inputs have not changed.

use std::collections::hash_map::Entry;

use ahash::{HashMap, HashMapExt};
use geojson::{Feature, FeatureCollection, JsonObject, Value};
use layerscope_types::geo::impls::GeoPoint2d;
use layerscope_types::geo::{GeoBoundingBox, GeoPoint};
use log::{debug, warn};
use serde_json::json;

use crate::error::EngineError;
use crate::feature::{new_feature, point_lonlat};
use crate::layer::{Layer, LayerId};

/// Smallest allowed cell size.
pub const MIN_CELL_SIZE_KM: f64 = 0.05;
/// Flat-earth length of one degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;
/// Lower bound of the latitude cosine used to compute the longitude step.
pub const MIN_LATITUDE_COSINE: f64 = 0.0001;
/// Maximum number of cells emitted by one aggregation.
pub const MAX_CELLS: usize = 5_000;
/// Labels are produced only when fewer cells than this are populated.
pub const MAX_LABEL_CELLS: usize = 1_000;

/// One populated grid cell.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// Row index, counted northwards from the southern edge of the aggregation box.
    pub row: i64,
    /// Column index, counted eastwards from the western edge of the aggregation box.
    pub col: i64,
    /// Number of points in the cell.
    pub count: usize,
    /// Extent of the cell.
    pub bounds: GeoBoundingBox,
}

impl GridCell {
    /// Center of the cell.
    pub fn center(&self) -> GeoPoint2d {
        self.bounds.center()
    }

    /// Converts the cell into a GeoJSON polygon feature with `count`, `row` and `col` properties.
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("count".into(), json!(self.count));
        properties.insert("row".into(), json!(self.row));
        properties.insert("col".into(), json!(self.col));

        new_feature(
            Value::Polygon(vec![self.bounds.into_ring()]),
            Some(properties),
        )
    }
}

/// Count label placed at the center of a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLabel {
    /// Latitude of the label.
    pub lat: f64,
    /// Longitude of the label.
    pub lng: f64,
    /// Number of points in the cell.
    pub count: usize,
}

/// Result of a grid aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct GridAggregation {
    /// Emitted cells, in the order their first point appears in the input.
    pub cells: Vec<GridCell>,
    /// Largest count among the emitted cells, `1` if no cells were emitted.
    pub max_count: usize,
    /// Count labels. Empty unless requested and fewer than [`MAX_LABEL_CELLS`] cells are
    /// populated.
    pub labels: Vec<GridLabel>,
}

impl GridAggregation {
    /// Aggregation without any cells.
    pub fn empty() -> Self {
        Self {
            cells: vec![],
            max_count: 1,
            labels: vec![],
        }
    }

    /// Relative density of the cell, `count / max_count`.
    pub fn intensity(&self, cell: &GridCell) -> f64 {
        cell.count as f64 / self.max_count.max(1) as f64
    }

    /// Sum of the counts of all emitted cells.
    pub fn total_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.count).sum()
    }

    /// Converts the emitted cells into a feature collection of polygons.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.cells.iter().map(GridCell::to_feature).collect(),
            foreign_members: None,
        }
    }
}

/// Cell dimensions and origin of one binning.
#[derive(Debug, Clone, Copy)]
struct Binning {
    west: f64,
    south: f64,
    lat_step: f64,
    lng_step: f64,
}

impl Binning {
    fn new(bbox: &GeoBoundingBox, cell_size_km: f64) -> Self {
        let cell_size_km = clamp_cell_size(cell_size_km);
        let lat_step = cell_size_km / KM_PER_DEGREE;
        let cos_lat = bbox
            .center()
            .lat_rad()
            .cos()
            .max(MIN_LATITUDE_COSINE);

        Self {
            west: bbox.west(),
            south: bbox.south(),
            lat_step,
            lng_step: lat_step / cos_lat,
        }
    }

    fn cell_of(&self, lon: f64, lat: f64) -> (i64, i64) {
        let row = ((lat - self.south) / self.lat_step).floor() as i64;
        let col = ((lon - self.west) / self.lng_step).floor() as i64;
        (row, col)
    }

    fn bounds(&self, row: i64, col: i64) -> GeoBoundingBox {
        let south = self.south + row as f64 * self.lat_step;
        let west = self.west + col as f64 * self.lng_step;
        GeoBoundingBox::new(west, south, west + self.lng_step, south + self.lat_step)
    }
}

/// Clamps the cell size to [`MIN_CELL_SIZE_KM`]. Non-finite sizes become the minimum.
pub fn clamp_cell_size(cell_size_km: f64) -> f64 {
    if cell_size_km.is_finite() {
        cell_size_km.max(MIN_CELL_SIZE_KM)
    } else {
        MIN_CELL_SIZE_KM
    }
}

/// Counts point features per grid cell.
///
/// The grid starts at the south-western corner of `bbox`. Points outside the box are binned too,
/// into cells with negative or out-of-box indices. Features that are not `Point`s are skipped.
///
/// At most [`MAX_CELLS`] cells are emitted; counts of the remaining cells are dropped and do not
/// take part in `max_count`. An empty input or a degenerate box gives an empty aggregation. An
/// inverted box is a caller error.
pub fn aggregate(
    points: &[Feature],
    bbox: &GeoBoundingBox,
    cell_size_km: f64,
    labels_requested: bool,
) -> Result<GridAggregation, EngineError> {
    if bbox.is_inverted() {
        return Err(EngineError::InvertedBounds {
            south: bbox.south(),
            north: bbox.north(),
            west: bbox.west(),
            east: bbox.east(),
        });
    }

    if points.is_empty() || bbox.is_degenerate() {
        return Ok(GridAggregation::empty());
    }

    let binning = Binning::new(bbox, cell_size_km);

    let mut cell_indices: HashMap<(i64, i64), usize> = HashMap::new();
    let mut populated: Vec<((i64, i64), usize)> = Vec::new();
    for (lon, lat) in points.iter().filter_map(point_lonlat) {
        match cell_indices.entry(binning.cell_of(lon, lat)) {
            Entry::Occupied(entry) => populated[*entry.get()].1 += 1,
            Entry::Vacant(entry) => {
                populated.push((*entry.key(), 1));
                entry.insert(populated.len() - 1);
            }
        }
    }

    if populated.len() > MAX_CELLS {
        warn!(
            "Grid has {} populated cells, only the first {MAX_CELLS} are emitted",
            populated.len()
        );
    }

    let cells: Vec<GridCell> = populated
        .iter()
        .take(MAX_CELLS)
        .map(|&((row, col), count)| GridCell {
            row,
            col,
            count,
            bounds: binning.bounds(row, col),
        })
        .collect();

    let max_count = cells.iter().map(|cell| cell.count).max().unwrap_or(1);

    let labels = if labels_requested && populated.len() < MAX_LABEL_CELLS {
        cells
            .iter()
            .map(|cell| {
                let center = cell.center();
                GridLabel {
                    lat: center.lat(),
                    lng: center.lon(),
                    count: cell.count,
                }
            })
            .collect()
    } else {
        vec![]
    };

    debug!(
        "Aggregated {} points into {} cells (max count {max_count}, {} labels)",
        points.len(),
        cells.len(),
        labels.len()
    );

    Ok(GridAggregation {
        cells,
        max_count,
        labels,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MemoKey {
    layer: LayerId,
    revision: u64,
    bbox: [u64; 4],
    cell_size: u64,
    labels: bool,
}

impl MemoKey {
    fn new(layer: &Layer, bbox: &GeoBoundingBox) -> Self {
        let grid = layer.grid();
        Self {
            layer: layer.id(),
            revision: layer.revision(),
            bbox: [
                bbox.west().to_bits(),
                bbox.south().to_bits(),
                bbox.east().to_bits(),
                bbox.north().to_bits(),
            ],
            cell_size: clamp_cell_size(grid.cell_size_km).to_bits(),
            labels: grid.show_labels,
        }
    }
}

/// Keeps the last aggregation of a layer and returns it while the layer features, the bounding
/// box and the grid settings stay the same.
#[derive(Debug, Default)]
pub struct GridMemo {
    cached: Option<(MemoKey, GridAggregation)>,
}

impl GridMemo {
    /// Creates an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the aggregation of the layer points inside the given box, recomputing it only if
    /// any of the inputs changed since the previous call.
    pub fn aggregate(
        &mut self,
        layer: &Layer,
        bbox: &GeoBoundingBox,
    ) -> Result<&GridAggregation, EngineError> {
        let key = MemoKey::new(layer, bbox);
        let entry = match self.cached.take() {
            Some((cached_key, aggregation)) if cached_key == key => (cached_key, aggregation),
            _ => {
                let grid = layer.grid();
                let aggregation = aggregate(
                    &layer.features().features,
                    bbox,
                    grid.cell_size_km,
                    grid.show_labels,
                )?;
                (key, aggregation)
            }
        };

        let (_, aggregation) = self.cached.insert(entry);
        Ok(aggregation)
    }

    /// Returns true if the memo holds an aggregation for exactly these inputs.
    pub fn is_fresh(&self, layer: &Layer, bbox: &GeoBoundingBox) -> bool {
        let key = MemoKey::new(layer, bbox);
        matches!(&self.cached, Some((cached_key, _)) if *cached_key == key)
    }

    /// Drops the stored aggregation.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
