//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum LayerscopeTypesError {
    /// Projection definition was not accepted.
    #[error("invalid projection definition: {0}")]
    ProjectionDefinition(String),
}
