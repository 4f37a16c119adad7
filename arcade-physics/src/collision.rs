mod circle_circle;
mod circle_polygon;

use crate::{ geometry, Body, BodyHandle, Circle, ConvexPolygon, Shape, SimulationConfig };

use glam::Vec2;
use ordered_float::OrderedFloat as OF;

/// A collision between two bodies found during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResult {
    /// Time of impact, counted from the start of the tested time budget
    pub time: f32,
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    /// Unit vector from `body_b` toward `body_a`, zero for ghost overlaps
    pub normal: Vec2,
    /// World-space contact point
    pub intersection: Vec2,
}

impl CollisionResult {
    /// The same collision seen from `body_b`
    pub fn inverted(&self) -> Self {
        Self {
            time: self.time,
            body_a: self.body_b,
            body_b: self.body_a,
            normal: -self.normal,
            intersection: self.intersection,
        }
    }
}

/// Position correction for bodies that already overlap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Popout {
    pub body: BodyHandle,
    pub position: Vec2,
}

/// Outcome of testing one pair of bodies
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection {
    Miss,
    Hit(CollisionResult),
    /// No collision during the time budget but the bodies overlap right now
    Popout(Popout),
}

impl Detection {
    pub fn hit(self) -> Option<CollisionResult> {
        match self {
            Detection::Hit(result) => Some(result),
            _ => None,
        }
    }

    fn inverted(self) -> Self {
        match self {
            Detection::Hit(result) => Detection::Hit(result.inverted()),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BodyRef<'a> {
    pub handle: BodyHandle,
    pub body: &'a Body,
}

impl<'a> BodyRef<'a> {
    pub fn new(handle: BodyHandle, body: &'a Body) -> Self {
        Self { handle, body }
    }
}

/// Finds the earliest collision between `a` and `b` in the next `dt` seconds.
pub fn detect(a: BodyRef<'_>, b: BodyRef<'_>, dt: f32, config: &SimulationConfig) -> Detection {
    match (a.body.shape(), b.body.shape()) {
        (Shape::Circle(circle_a), Shape::Circle(circle_b)) => {
            circle_circle::detect(a, circle_a, b, circle_b, dt, config)
        },
        (Shape::Circle(circle), Shape::Polygon(polygon)) => {
            circle_polygon::detect(a, circle, b, polygon, dt, config)
        },
        (Shape::Polygon(polygon), Shape::Circle(circle)) => {
            circle_polygon::detect(b, circle, a, polygon, dt, config).inverted()
        },
        // Not supported, static scenery is made of anchored polygons and
        // everything moving is a circle
        (Shape::Polygon(_), Shape::Polygon(_)) => Detection::Miss,
    }
}

fn earliest(best: Option<CollisionResult>, candidate: CollisionResult) -> Option<CollisionResult> {
    [best, Some(candidate)].into_iter()
        .flatten()
        .min_by_key(|result| OF(result.time))
}
