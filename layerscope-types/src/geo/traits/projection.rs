/// Conversion between geographic points and points of a projected coordinate system.
pub trait Projection {
    /// Geographic point type.
    type InPoint;
    /// Projected point type.
    type OutPoint;

    /// Projects a geographic point. Returns `None` if the point cannot be projected.
    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint>;
    /// Converts a projected point back into geographic coordinates.
    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint>;
}
