use super::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub(crate) radius: f32,
}

impl Circle {
    pub fn radius(&self) -> f32 {
        self.radius
    }

    fn moment_of_inertia(&self, mass: f32) -> f32 {
        0.5 * mass * self.radius * self.radius
    }
}

/// Polygon in local space, counter-clockwise.
///
/// Non-convex polygons are accepted but go through the slower collision path.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    pub(crate) vertices: Vec<Vec2>,
    pub(crate) convex: bool,
}

impl ConvexPolygon {
    pub(crate) fn try_new(vertices: Vec<Vec2>) -> Result<Self, BodyError> {
        const MINIMUM_VERTICES: usize = 3;

        if vertices.len() < MINIMUM_VERTICES {
            return Err(BodyError::TooFewVertices(vertices.len()));
        }
        if let Some(index) = vertices.iter().position(|vertex| !vertex.is_finite()) {
            return Err(BodyError::NonFiniteVertex { index });
        }
        if geometry::polygon_signed_area(&vertices) <= 0. {
            return Err(BodyError::ClockwiseWinding);
        }

        let convex = geometry::poly_is_convex(&vertices);
        Ok(Self { vertices, convex })
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn is_convex(&self) -> bool {
        self.convex
    }

    pub fn world_vertices(&self, position: Vec2, angle: f32) -> Vec<Vec2> {
        let rotation = Vec2::from_angle(angle);
        self.vertices.iter()
            .map(|&vertex| position + rotation.rotate(vertex))
            .collect()
    }

    /// Not the real polygon inertia, only the spread of the vertices around
    /// their average. Tuning elsewhere depends on this exact value.
    fn moment_of_inertia(&self, mass: f32) -> f32 {
        let centroid = geometry::polygon_centroid(&self.vertices);
        let spread = self.vertices.iter()
            .map(|&vertex| vertex.distance_squared(centroid))
            .sum::<f32>();
        mass / self.vertices.len() as f32 * spread
    }
}

/// The closed set of collision shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(ConvexPolygon),
}

impl Shape {
    pub fn moment_of_inertia(&self, mass: f32) -> f32 {
        match self {
            Shape::Circle(circle) => circle.moment_of_inertia(mass),
            Shape::Polygon(polygon) => polygon.moment_of_inertia(mass),
        }
    }

    pub fn as_circle(&self) -> Option<&Circle> {
        match self {
            Shape::Circle(circle) => Some(circle),
            Shape::Polygon(_) => None,
        }
    }

    pub fn as_polygon(&self) -> Option<&ConvexPolygon> {
        match self {
            Shape::Circle(_) => None,
            Shape::Polygon(polygon) => Some(polygon),
        }
    }
}
