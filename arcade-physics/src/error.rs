use std::fmt;

/// Reasons a body cannot be built or reconfigured.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyError {
    /// Mass must be strictly positive and finite
    InvalidMass(f32),
    InvalidRadius(f32),
    InvalidDimensions { width: f32, height: f32 },
    /// The moment of inertia (given or derived from the shape) must be
    /// strictly positive and finite
    InvalidMomentOfInertia(f32),
    TooFewVertices(usize),
    NonFiniteVertex { index: usize },
    /// Polygons must be given in counter-clockwise order
    ClockwiseWinding,
    /// Vertices were given to a body that is not a polygon
    NotAPolygon,
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMass(mass) => write!(f, "invalid mass {mass}, must be strictly positive"),
            Self::InvalidRadius(radius) => write!(f, "invalid radius {radius}, must be strictly positive"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid rectangle size {width}x{height}, must be strictly positive")
            }
            Self::InvalidMomentOfInertia(inertia) => {
                write!(f, "invalid moment of inertia {inertia}, must be strictly positive")
            }
            Self::TooFewVertices(count) => write!(f, "a polygon needs at least 3 vertices, got {count}"),
            Self::NonFiniteVertex { index } => write!(f, "vertex {index} is not finite"),
            Self::ClockwiseWinding => write!(f, "polygon vertices are not in counter-clockwise order"),
            Self::NotAPolygon => write!(f, "only polygons have vertices"),
        }
    }
}

impl std::error::Error for BodyError {}
