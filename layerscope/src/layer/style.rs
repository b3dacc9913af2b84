use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::EngineError;
use crate::grid::{GridAggregation, GridCell};

/// Display attributes of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerStyle {
    /// Base color of the layer's features.
    pub color: Color,
    /// Opacity of the layer, `0..=1`.
    pub opacity: f64,
    /// Whether the layer is drawn.
    pub visible: bool,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            color: Color::LAYER_DEFAULT,
            opacity: 1.0,
            visible: true,
        }
    }
}

impl LayerStyle {
    /// Parses the style from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Layer color with the layer opacity applied.
    pub fn effective_color(&self) -> Color {
        self.color.with_opacity(self.opacity)
    }
}

/// Density grid settings of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Whether the grid overlay is shown instead of the individual points.
    pub enabled: bool,
    /// Whether count labels are drawn in the cells.
    pub show_labels: bool,
    /// Cell size in kilometers. Values below [`MIN_CELL_SIZE_KM`](crate::grid::MIN_CELL_SIZE_KM)
    /// are clamped when aggregating.
    pub cell_size_km: f64,
    /// Fill opacity of the densest cell.
    pub fill_opacity: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            show_labels: true,
            cell_size_km: 1.0,
            fill_opacity: 0.6,
        }
    }
}

impl GridConfig {
    /// Parses the grid configuration from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Fill opacity of a cell, proportional to its count relative to the densest emitted cell.
    pub fn cell_opacity(&self, cell: &GridCell, aggregation: &GridAggregation) -> f64 {
        self.fill_opacity * aggregation.intensity(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn grid_config_defaults() {
        let config = GridConfig::from_json(r#"{"enabled": true}"#).unwrap();
        assert_eq!(
            config,
            GridConfig {
                enabled: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn grid_config_rejects_wrong_types() {
        assert_matches!(
            GridConfig::from_json(r#"{"cell_size_km": "big"}"#),
            Err(EngineError::Config(_))
        );
    }

    #[test]
    fn style_from_json() {
        let style = LayerStyle::from_json(r##"{"color": "#FF000080", "opacity": 0.5}"##).unwrap();

        assert_eq!(style.color, Color::rgba(255, 0, 0, 128));
        assert!(style.visible);
        assert_eq!(style.effective_color().a(), 64);
    }
}
