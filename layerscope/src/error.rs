//! Error types used by the crate.

use layerscope_types::error::LayerscopeTypesError;
use thiserror::Error;

/// Layerscope engine error type.
///
/// Malformed geodata never produces an error: operations degrade to empty results instead. Errors
/// are reserved for contract violations and misconfiguration.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bounding box with the southern edge north of the northern one (or western edge east of the
    /// eastern one).
    #[error("inverted bounding box: south {south}, north {north}, west {west}, east {east}")]
    InvertedBounds {
        /// Southern edge.
        south: f64,
        /// Northern edge.
        north: f64,
        /// Western edge.
        west: f64,
        /// Eastern edge.
        east: f64,
    },
    /// Source coordinate system definition could not be used.
    #[error("unknown coordinate system")]
    UnknownCrs(#[from] LayerscopeTypesError),
    /// Configuration could not be parsed.
    #[error("invalid configuration")]
    Config(#[from] serde_json::Error),
}
