use super::*;

use itertools::Itertools;

/// How a circle that is not going to hit anything already overlaps a polygon,
/// corners win over edges
#[derive(Debug, Clone, Copy)]
enum Penetration {
    None,
    /// Target position of the circle center
    Edge(Vec2),
    Corner(Vec2),
}

impl Penetration {
    fn rank(&self) -> u8 {
        match self {
            Penetration::None => 0,
            Penetration::Edge(_) => 1,
            Penetration::Corner(_) => 2,
        }
    }

    fn raise(&mut self, other: Penetration) {
        if other.rank() > self.rank() {
            *self = other;
        }
    }

    fn target(&self) -> Option<Vec2> {
        match *self {
            Penetration::None => None,
            Penetration::Edge(target) | Penetration::Corner(target) => Some(target),
        }
    }
}

/// `circle_ref` is always `body_a` of the result
pub(super) fn detect(
    circle_ref: BodyRef<'_>, circle: &Circle,
    polygon_ref: BodyRef<'_>, polygon: &ConvexPolygon,
    dt: f32, config: &SimulationConfig,
) -> Detection {
    let vertices = polygon.world_vertices(polygon_ref.body.position, polygon_ref.body.angle);
    let radius = circle.radius;
    let center = circle_ref.body.position;

    let polygon_velocity = polygon_ref.body.effective_velocity();
    let relative = circle_ref.body.effective_velocity() - polygon_velocity;
    // The polygon is treated as stationary, the center sweeps its
    // rounded outline
    let end = center + relative * dt;

    let result = |t: f32, normal: Vec2, contact: Vec2| {
        let time = t * dt;
        CollisionResult {
            time,
            body_a: circle_ref.handle,
            body_b: polygon_ref.handle,
            normal,
            intersection: contact + polygon_velocity * time,
        }
    };

    let mut best = None;
    let mut penetration = Penetration::None;
    let separation = radius * config.popout_separation;

    for (previous, corner, next) in vertices.iter().copied().circular_tuple_windows() {
        let incoming = corner - previous;
        let edge = next - corner;

        // Edge from `corner` to `next`
        if let Some(normal) = geometry::perp(edge).try_normalize() {
            if normal.dot(relative) < 0. {
                let offset = normal * radius;
                if let Some(t) = geometry::segment_vs_segment(center, end, corner + offset, next + offset) {
                    let contact = center + relative * (t * dt) - offset;
                    let hit = result(t, normal, contact);
                    if polygon.convex {
                        return Detection::Hit(hit);
                    }
                    best = earliest(best, hit);
                }
            }

            let along = ((center - corner).dot(edge) / edge.length_squared()).clamp(0., 1.);
            if (corner + edge * along).distance_squared(center) < radius * radius {
                let depth = (center - corner).dot(normal);
                penetration.raise(Penetration::Edge(center + normal * (separation - depth)));
            }
        }

        // Rounded corner
        if let Some(hit) = geometry::segment_vs_circle(center, end, corner, radius)
            && hit.normal.dot(incoming) >= 0.
            && hit.normal.dot(edge) <= 0.
        {
            let hit = result(hit.t, hit.normal, corner);
            if polygon.convex {
                return Detection::Hit(hit);
            }
            best = earliest(best, hit);
        }

        let from_corner = center - corner;
        if from_corner.length_squared() < radius * radius {
            let direction = from_corner.try_normalize()
                .unwrap_or_else(|| (-incoming).try_normalize().unwrap_or(Vec2::Y));
            penetration.raise(Penetration::Corner(corner + direction * separation));
        }
    }

    if let Some(hit) = best {
        return Detection::Hit(hit);
    }

    if matches!(penetration, Penetration::None) {
        let inside = if polygon.convex {
            geometry::poly_contains(&vertices, center)
        } else {
            geometry::crossing_contains(&vertices, center)
        };
        if inside {
            penetration = shallowest_exit(&vertices, center, separation);
        }
    }

    let Some(target) = penetration.target()
    else { return Detection::Miss };

    if circle_ref.body.is_ghost() || polygon_ref.body.is_ghost() {
        return Detection::Hit(CollisionResult {
            time: 0.,
            body_a: circle_ref.handle,
            body_b: polygon_ref.handle,
            normal: Vec2::ZERO,
            intersection: center,
        });
    }

    if !circle_ref.body.is_anchored() {
        Detection::Popout(Popout { body: circle_ref.handle, position: target })
    }
    else if !polygon_ref.body.is_anchored() {
        Detection::Popout(Popout {
            body: polygon_ref.handle,
            position: polygon_ref.body.position - (target - center),
        })
    }
    else {
        Detection::Miss
    }
}

/// Center fully inside the polygon, leaves through the closest edge
fn shallowest_exit(vertices: &[Vec2], center: Vec2, separation: f32) -> Penetration {
    vertices.iter().copied()
        .circular_tuple_windows()
        .filter_map(|(start, end)| {
            let normal = geometry::perp(end - start).try_normalize()?;
            Some((normal, (center - start).dot(normal)))
        })
        .max_by_key(|&(_, depth)| OF(depth))
        .map(|(normal, depth)| Penetration::Edge(center + normal * (separation - depth)))
        .unwrap_or(Penetration::None)
}
