use super::*;

pub(super) fn detect(
    a: BodyRef<'_>, circle_a: &Circle,
    b: BodyRef<'_>, circle_b: &Circle,
    dt: f32, config: &SimulationConfig,
) -> Detection {
    let radius_sum = circle_a.radius + circle_b.radius;
    let offset = a.body.position - b.body.position;

    let mut popout = None;
    if offset.length_squared() < config.penetration_threshold * radius_sum * radius_sum {
        if a.body.is_ghost() || b.body.is_ghost() {
            return Detection::Hit(CollisionResult {
                time: 0.,
                body_a: a.handle,
                body_b: b.handle,
                normal: Vec2::ZERO,
                intersection: a.body.position - offset * (circle_a.radius / radius_sum),
            });
        }
        popout = push_apart(a, b, offset, radius_sum * config.popout_separation);
    }

    let velocity_a = a.body.effective_velocity();
    let velocity_b = b.body.effective_velocity();
    let relative = velocity_a - velocity_b;

    // B is treated as stationary, A sweeps a circle of the summed radii
    let start = a.body.position;
    let end = start + relative * dt;
    if let Some(hit) = geometry::segment_vs_circle(start, end, b.body.position, radius_sum) {
        let time = hit.t * dt;
        let center_a = a.body.position + velocity_a * time;
        let center_b = b.body.position + velocity_b * time;
        return Detection::Hit(CollisionResult {
            time,
            body_a: a.handle,
            body_b: b.handle,
            normal: hit.normal,
            intersection: center_a + (center_b - center_a) * (circle_a.radius / radius_sum),
        });
    }

    popout.map(Detection::Popout).unwrap_or(Detection::Miss)
}

/// Moves whichever body is free so the two are `distance` apart along `offset`
fn push_apart(a: BodyRef<'_>, b: BodyRef<'_>, offset: Vec2, distance: f32) -> Option<Popout> {
    // concentric circles have no preferred direction
    let direction = offset.try_normalize().unwrap_or(Vec2::Y);

    if !a.body.is_anchored() {
        Some(Popout { body: a.handle, position: b.body.position + direction * distance })
    }
    else if !b.body.is_anchored() {
        Some(Popout { body: b.handle, position: a.body.position - direction * distance })
    }
    else {
        None
    }
}

#[cfg(test)]
mod tests {
    use crate::{ Body, BodyFlags, Detection, World };
    use approx::assert_relative_eq;
    use glam::Vec2;

    fn circle(world: &mut World, position: Vec2, velocity: Vec2) -> crate::BodyHandle {
        world.insert(Body::circle(1., position, 1.).expect("Valid").with_velocity(velocity))
    }

    #[test]
    fn test_head_on() {
        let mut world = World::new();
        let a = circle(&mut world, Vec2::new(-5., 0.), Vec2::X * 2.);
        let b = circle(&mut world, Vec2::new(5., 0.), Vec2::X * -2.);

        let hit = world.detect(a, b, 10.).and_then(Detection::hit).expect("Should hit");
        // 8 units closed at 4 units per second
        assert_relative_eq!(hit.time, 2.);
        assert_relative_eq!(hit.normal.x, -1.);
        assert_relative_eq!(hit.normal.y, 0.);
        assert_relative_eq!(hit.intersection.x, 0., epsilon = 1e-5);
        assert_eq!(hit.body_a, a);
        assert_eq!(hit.body_b, b);
    }

    #[test]
    fn test_too_short_budget_misses() {
        let mut world = World::new();
        let a = circle(&mut world, Vec2::new(-5., 0.), Vec2::X * 2.);
        let b = circle(&mut world, Vec2::new(5., 0.), Vec2::ZERO);
        assert_eq!(world.detect(a, b, 1.), Some(Detection::Miss));
    }

    #[test]
    fn test_separating_circles_miss() {
        let mut world = World::new();
        let a = circle(&mut world, Vec2::new(-2.5, 0.), Vec2::X * -2.);
        let b = circle(&mut world, Vec2::new(0., 0.), Vec2::ZERO);
        assert_eq!(world.detect(a, b, 10.), Some(Detection::Miss));
    }

    #[test]
    fn test_anchored_velocity_is_ignored() {
        let mut world = World::new();
        let a = circle(&mut world, Vec2::new(-5., 0.), Vec2::ZERO);
        let b = world.insert(Body::circle(1., Vec2::new(5., 0.), 1.).expect("Valid")
            .with_velocity(Vec2::X * -100.)
            .with_flags(BodyFlags::ANCHORED));
        assert_eq!(world.detect(a, b, 10.), Some(Detection::Miss));
    }

    #[test]
    fn test_deep_overlap_pops_the_free_body() {
        let mut world = World::new();
        let a = world.insert(Body::circle(1., Vec2::ZERO, 1.).expect("Valid")
            .with_flags(BodyFlags::ANCHORED));
        let b = circle(&mut world, Vec2::new(1., 0.), Vec2::ZERO);

        let Some(Detection::Popout(popout)) = world.detect(a, b, 1.)
        else { panic!("Expected a popout") };
        assert_eq!(popout.body, b);
        assert_relative_eq!(popout.position.x, 2. * world.config().popout_separation);
        assert_relative_eq!(popout.position.y, 0.);
    }

    #[test]
    fn test_overlap_moving_apart_is_a_popout() {
        let mut world = World::new();
        let a = circle(&mut world, Vec2::new(-0.5, 0.), Vec2::X * -1.);
        let b = circle(&mut world, Vec2::new(0.5, 0.), Vec2::X);
        let Some(Detection::Popout(popout)) = world.detect(a, b, 1.)
        else { panic!("Expected a popout") };
        // A comes first when both are free
        assert_eq!(popout.body, a);
        assert!(popout.position.x < -1.);
    }

    #[test]
    fn test_overlap_moving_closer_is_a_hit() {
        let mut world = World::new();
        let a = circle(&mut world, Vec2::new(-0.5, 0.), Vec2::X);
        let b = circle(&mut world, Vec2::new(0.5, 0.), Vec2::ZERO);
        let hit = world.detect(a, b, 1.).and_then(Detection::hit).expect("Should hit");
        assert_eq!(hit.time, 0.);
        assert_relative_eq!(hit.normal.x, -1.);
    }

    #[test]
    fn test_ghost_overlap() {
        let mut world = World::new();
        let a = circle(&mut world, Vec2::ZERO, Vec2::ZERO);
        let b = world.insert(Body::circle(1., Vec2::new(0.5, 0.), 1.).expect("Valid")
            .with_flags(BodyFlags::GHOST));
        let hit = world.detect(a, b, 1.).and_then(Detection::hit).expect("Should hit");
        assert_eq!(hit.time, 0.);
        assert_eq!(hit.normal, Vec2::ZERO);
        assert_relative_eq!(hit.intersection.x, 0.25);
    }

    #[test]
    fn test_both_anchored_overlap_misses() {
        let mut world = World::new();
        let a = world.insert(Body::circle(1., Vec2::ZERO, 1.).expect("Valid")
            .with_flags(BodyFlags::ANCHORED));
        let b = world.insert(Body::circle(1., Vec2::new(0.5, 0.), 1.).expect("Valid")
            .with_flags(BodyFlags::ANCHORED));
        assert_eq!(world.detect(a, b, 1.), Some(Detection::Miss));
    }
}
