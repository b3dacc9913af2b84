//! Points in projected (cartesian) coordinates.

pub use nalgebra::Point2;
use nalgebra::Scalar;
use num_traits::Float;

/// 2d point with `f64` coordinates, e.g. easting and northing of a projected grid.
pub type Point2d = Point2<f64>;

/// Point in 2d cartesian space.
pub trait CartesianPoint2d {
    /// Numeric type of the coordinates.
    type Num: Float;

    /// X coordinate (easting).
    fn x(&self) -> Self::Num;
    /// Y coordinate (northing).
    fn y(&self) -> Self::Num;
}

/// Cartesian point that can be constructed from its coordinates.
pub trait NewCartesianPoint2d<Num = f64>: CartesianPoint2d<Num = Num> {
    /// Creates a new point.
    fn new(x: Num, y: Num) -> Self;
}

impl<N: Float + Scalar> CartesianPoint2d for Point2<N> {
    type Num = N;

    fn x(&self) -> N {
        self.x
    }

    fn y(&self) -> N {
        self.y
    }
}

impl<N: Float + Scalar> NewCartesianPoint2d<N> for Point2<N> {
    fn new(x: N, y: N) -> Self {
        Point2::new(x, y)
    }
}
