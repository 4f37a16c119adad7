//! Stateless 2D intersection math used by the collision tests.

use glam::Vec2;
use itertools::Itertools;

/// Rotates `v` by -90°
pub fn perp(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// 2D cross product
pub fn perp_dot(v1: Vec2, v2: Vec2) -> f32 {
    v1.x * v2.y - v1.y * v2.x
}

/// Perpendicular distance from `point` to the infinite line going through `a` and `b`.
/// Falls back to the distance to `a` if both points are the same.
pub fn distance_to_line(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let line = b - a;
    let len = line.length();
    if len == 0. {
        return point.distance(a);
    }
    perp_dot(line, point - a).abs() / len
}

/// Intersection of the segments `p0 -> p1` and `q0 -> q1`, returning the
/// position of the intersection along P (0 at `p0`, 1 at `p1`).
///
/// Parallel, collinear and degenerate segments never intersect.
pub fn segment_vs_segment(p0: Vec2, p1: Vec2, q0: Vec2, q1: Vec2) -> Option<f32> {
    let q_normal = perp(q1 - q0);
    let dp0 = (p0 - q0).dot(q_normal);
    let dp1 = (p1 - q0).dot(q_normal);
    // both ends of P strictly on the same side of Q
    if (dp0 > 0. && dp1 > 0.) || (dp0 < 0. && dp1 < 0.) {
        return None;
    }

    // and the other way around, the first check alone lets some
    // float edge cases through
    let p_normal = perp(p1 - p0);
    let dq0 = (q0 - p0).dot(p_normal);
    let dq1 = (q1 - p0).dot(p_normal);
    if (dq0 > 0. && dq1 > 0.) || (dq0 < 0. && dq1 < 0.) {
        return None;
    }

    let denominator = dp0 - dp1;
    if denominator == 0. {
        return None;
    }
    Some(dp0 / denominator)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentCircleHit {
    /// Position of the hit along the segment, in `[0, 1]`
    pub t: f32,
    /// Unit vector from the circle center to the hit point
    pub normal: Vec2,
}

/// Swept test of a point moving from `p0` to `p1` against a stationary circle.
///
/// A start point already inside the circle while moving toward its center
/// hits at `t = 0`.
pub fn segment_vs_circle(p0: Vec2, p1: Vec2, center: Vec2, radius: f32) -> Option<SegmentCircleHit> {
    let delta = p1 - p0;
    let to_center = center - p0;

    // Going away from the circle (or not moving at all)
    if delta.dot(to_center) <= 0. {
        return None;
    }

    let length = delta.length();
    let direction = delta / length;
    let projection = to_center.dot(direction);
    let distance = perp_dot(direction, to_center).abs();

    if distance > radius {
        return None;
    }

    let hit_length = if distance == radius {
        // tangent, single contact point
        projection
    }
    else {
        // two intersections, the first one is half a chord before the projection
        let half_chord = (radius * radius - distance * distance).sqrt();
        projection - half_chord
    };

    let t = (hit_length / length).max(0.);
    if t > 1. {
        return None;
    }

    let hit_point = p0 + delta * t;
    let normal = (hit_point - center).try_normalize()
        .unwrap_or_else(|| -direction);

    Some(SegmentCircleHit { t, normal })
}

/// Point in convex polygon test, vertices must be in counter-clockwise order.
/// Points exactly on an edge are outside.
pub fn poly_contains(vertices: &[Vec2], point: Vec2) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    vertices.iter().copied()
        .circular_tuple_windows()
        .all(|(start, end)| perp_dot(point - start, end - point) < 0.)
}

/// Even-odd point in polygon test, works for any simple polygon
pub fn crossing_contains(vertices: &[Vec2], point: Vec2) -> bool {
    vertices.iter().copied()
        .circular_tuple_windows()
        .filter(|&(a, b)| (a.y > point.y) != (b.y > point.y))
        .filter(|&(a, b)| point.x < a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y))
        .count() % 2 == 1
}

/// Checks that every corner of the polygon is a strict left turn.
pub fn poly_is_convex(vertices: &[Vec2]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    vertices.iter().copied()
        .circular_tuple_windows()
        .all(|(a, b, c)| perp_dot(b - a, c - b) > 0.)
}

/// Average of the vertices
pub fn polygon_centroid(vertices: &[Vec2]) -> Vec2 {
    if vertices.is_empty() {
        return Vec2::ZERO;
    }
    vertices.iter().copied().sum::<Vec2>() / vertices.len() as f32
}

/// Shoelace formula, positive for counter-clockwise polygons
pub fn polygon_signed_area(vertices: &[Vec2]) -> f32 {
    vertices.iter().copied()
        .circular_tuple_windows()
        .map(|(a, b)| perp_dot(a, b))
        .sum::<f32>() / 2.
}

/// Counter-clockwise corners of a `width` by `height` rectangle centered on the origin
pub fn rect_vertices(width: f32, height: f32) -> [Vec2; 4] {
    let w2 = width / 2.;
    let h2 = height / 2.;
    [
        Vec2::new(-w2, -h2),
        Vec2::new( w2, -h2),
        Vec2::new( w2,  h2),
        Vec2::new(-w2,  h2),
    ]
}
