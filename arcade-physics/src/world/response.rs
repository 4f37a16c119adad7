use super::*;
use crate::geometry::perp_dot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Response {
    /// Unknown bodies or pair already resolved during this pass
    Skipped,
    Vetoed,
    Applied,
}

/// Impulse based response with Coulomb friction.
///
/// Each pair is resolved at most once per collision pass.
pub(super) fn apply(
    bodies: &mut DenseSlotMap<BodyHandle, Body>,
    result: &CollisionResult,
    config: &SimulationConfig,
) -> Response {
    let Some([a, b]) = bodies.get_disjoint_mut([result.body_a, result.body_b])
    else { return Response::Skipped };

    if a.collision_list.contains(&result.body_b) {
        return Response::Skipped;
    }
    a.collision_list.push(result.body_b);
    b.collision_list.push(result.body_a);

    a.touching = Some(result.body_b);
    a.touch_normal = result.normal;
    b.touching = Some(result.body_a);
    b.touch_normal = -result.normal;

    let inverted = result.inverted();
    // both sides are always told, either one can veto
    let allowed_by_a = a.notify_collided(result);
    let allowed_by_b = b.notify_collided(&inverted);
    if !(allowed_by_a && allowed_by_b) {
        trace!(a = ?result.body_a, b = ?result.body_b, "Response vetoed");
        return Response::Vetoed;
    }

    let normal = snap_to_axis(result.normal, config.axis_snap_epsilon);
    let contact = result.intersection;
    let relative = a.point_velocity(contact) - b.point_velocity(contact);
    let normal_speed = relative.dot(normal);

    // separating contacts get no impulse
    if normal_speed < 0. {
        let elasticity = a.material.elasticity.min(b.material.elasticity);
        let friction = a.material.friction.max(b.material.friction);

        let offset_a = contact - a.position;
        let offset_b = contact - b.position;
        let (inverse_mass_a, inverse_inertia_a) = (a.inverse_mass(), a.inverse_inertia());
        let (inverse_mass_b, inverse_inertia_b) = (b.inverse_mass(), b.inverse_inertia());

        let effective_mass = |direction: Vec2| {
            let arm_a = perp_dot(offset_a, direction);
            let arm_b = perp_dot(offset_b, direction);
            inverse_mass_a + inverse_mass_b
                + arm_a * arm_a * inverse_inertia_a
                + arm_b * arm_b * inverse_inertia_b
        };

        let normal_mass = effective_mass(normal);
        if normal_mass > 0. {
            let normal_impulse = -(1. + elasticity) * normal_speed / normal_mass;

            let tangent = (relative - normal * normal_speed).try_normalize()
                .unwrap_or(Vec2::ZERO);
            let tangent_mass = effective_mass(tangent);
            let friction_impulse = if tangent != Vec2::ZERO && tangent_mass > 0. {
                let bound = (normal_impulse * friction).abs();
                (-relative.dot(tangent) / tangent_mass).clamp(-bound, bound)
            } else {
                0.
            };

            let impulse = normal * normal_impulse + tangent * friction_impulse;
            a.velocity += impulse * inverse_mass_a;
            a.angular_velocity += perp_dot(offset_a, impulse) * inverse_inertia_a;
            b.velocity -= impulse * inverse_mass_b;
            b.angular_velocity -= perp_dot(offset_b, impulse) * inverse_inertia_b;

            trace!(normal_impulse, friction_impulse, "Impulse applied");
        }
    }

    a.notify_responded(result);
    b.notify_responded(&inverted);
    Response::Applied
}

/// Normals within `epsilon` of an axis are snapped onto it
fn snap_to_axis(normal: Vec2, epsilon: f32) -> Vec2 {
    match (normal.x.abs() < epsilon, normal.y.abs() < epsilon) {
        (true, false) => Vec2::new(0., normal.y.signum()),
        (false, true) => Vec2::new(normal.x.signum(), 0.),
        _ => normal,
    }
}
