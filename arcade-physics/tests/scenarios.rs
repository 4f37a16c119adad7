use std::{ cell::{ Cell, RefCell }, rc::Rc };

use arcade_physics::{ Body, BodyFlags, BodyHandle, CollisionResult, Material, World };

use approx::assert_relative_eq;
use glam::Vec2;

const BOUNCY: Material = Material { elasticity: 1., friction: 0. };

fn ball(world: &mut World, radius: f32, position: Vec2, velocity: Vec2) -> BodyHandle {
    world.insert(Body::circle(radius, position, 1.).expect("Valid")
        .with_velocity(velocity)
        .with_material(BOUNCY))
}

fn position(world: &World, handle: BodyHandle) -> Vec2 {
    world.body(handle).expect("Body exists").position
}

fn velocity(world: &World, handle: BodyHandle) -> Vec2 {
    world.body(handle).expect("Body exists").velocity
}

#[test]
fn elastic_head_on_swaps_velocities() {
    let mut world = World::new();
    let left = ball(&mut world, 1., Vec2::new(-3., 0.), Vec2::X);
    let right = ball(&mut world, 1., Vec2::ZERO, Vec2::ZERO);

    world.update(2.);

    assert_relative_eq!(velocity(&world, left).x, 0., epsilon = 1e-5);
    assert_relative_eq!(velocity(&world, right).x, 1., epsilon = 1e-5);
    assert_relative_eq!(velocity(&world, left).y, 0.);
    assert_relative_eq!(velocity(&world, right).y, 0.);
    // right got the remaining second of travel
    assert_relative_eq!(position(&world, right).x, 1., epsilon = 1e-2);
}

#[test]
fn anchored_bodies_never_move() {
    let mut world = World::new();
    world.set_gravity(Vec2::new(0., -10.));
    let post = world.insert(Body::circle(1., Vec2::new(2., 0.), 0.1).expect("Valid")
        .with_flags(BodyFlags::ANCHORED)
        .with_velocity(Vec2::new(5., 5.)));
    let block = world.insert(Body::rect(2., 1., Vec2::new(0., -3.), 0.1).expect("Valid")
        .with_flags(BodyFlags::ANCHORED));
    world.add_circle(0.5, Vec2::new(-2., 0.), 100.).expect("Valid");
    world.body_mut(post).expect("Exists").angular_velocity = 3.;

    for _ in 0..120 {
        for handle in [post, block] {
            let body = world.body_mut(handle).expect("Exists");
            body.apply_force(Vec2::new(50., 50.));
            body.apply_torque(10.);
        }
        let ball = world.handles().last().expect("Three bodies");
        world.body_mut(ball).expect("Exists").velocity.x += 1.;
        world.update(1. / 60.);
    }

    assert_eq!(position(&world, post), Vec2::new(2., 0.));
    assert_eq!(position(&world, block), Vec2::new(0., -3.));
    assert_eq!(world.body(post).expect("Exists").angle, 0.);
    assert_eq!(world.body(block).expect("Exists").angle, 0.);
}

#[test]
fn anchored_mass_does_not_matter() {
    fn bounce_off(wall_mass: f32) -> Vec2 {
        let mut world = World::new();
        world.insert(Body::rect(1., 10., Vec2::new(3., 0.), wall_mass).expect("Valid")
            .with_flags(BodyFlags::ANCHORED)
            .with_material(BOUNCY));
        let ball = ball(&mut world, 0.5, Vec2::ZERO, Vec2::new(4., 1.));
        world.update(1.);
        velocity(&world, ball)
    }

    let light = bounce_off(0.001);
    let heavy = bounce_off(1e6);
    assert_eq!(light, heavy);
    assert_relative_eq!(light.x, -4., epsilon = 1e-4);
    assert_relative_eq!(light.y, 1., epsilon = 1e-4);
}

#[test]
fn ghosts_notify_without_interfering() {
    let mut world = World::new();
    let seen = Rc::new(RefCell::new(Vec::<CollisionResult>::new()));

    let zone = world.insert(Body::rect(4., 4., Vec2::ZERO, 1.).expect("Valid")
        .with_flags(BodyFlags::GHOST | BodyFlags::ANCHORED));
    let ghost_ball = world.insert(Body::circle(0.5, Vec2::new(3., 3.), 1.).expect("Valid")
        .with_flags(BodyFlags::GHOST)
        .with_velocity(Vec2::new(0., -1.)));
    let player = ball(&mut world, 0.5, Vec2::new(-4., 0.), Vec2::new(6., 0.));

    for handle in [zone, player] {
        let seen = Rc::clone(&seen);
        world.body_mut(handle).expect("Exists").on_collided(move |result| {
            seen.borrow_mut().push(*result);
            true
        });
    }

    for _ in 0..60 {
        world.update(1. / 60.);
    }

    assert_eq!(velocity(&world, player), Vec2::new(6., 0.));
    assert_relative_eq!(position(&world, player).x, 2., epsilon = 1e-3);
    assert_eq!(world.body(player).expect("Exists").angular_velocity, 0.);
    assert_eq!(velocity(&world, ghost_ball), Vec2::new(0., -1.));
    assert_eq!(position(&world, zone), Vec2::ZERO);

    let seen = seen.borrow();
    // every handler sees itself as body A
    assert!(seen.iter().any(|result| result.body_a == zone && result.body_b == player));
    assert!(seen.iter().any(|result| result.body_a == player && result.body_b == zone));
    assert!(seen.iter().all(|result| result.body_a == zone || result.body_a == player));
}

#[test]
fn slight_overlap_is_popped_out() {
    let mut world = World::new();
    let a = world.add_circle(1., Vec2::ZERO, 1.).expect("Valid");
    let b = world.add_circle(1., Vec2::new(1.92, 0.), 1.).expect("Valid");

    world.update(1. / 60.);

    assert!(position(&world, a).distance(position(&world, b)) >= 2.);
    assert_eq!(velocity(&world, a), Vec2::ZERO);
    assert_eq!(velocity(&world, b), Vec2::ZERO);
}

#[test]
fn overlap_is_only_popped_out_below_the_threshold() {
    // the threshold applies to the squared distance, so the limit is
    // sqrt(0.95) of the summed radii, about 2.5% of overlap
    let limit = 2. * World::new().config().penetration_threshold.sqrt();

    for (start, popped) in [(1.99, false), (1.96, false), (limit + 1e-3, false), (limit - 1e-3, true), (1.94, true)] {
        let mut world = World::new();
        let a = world.add_circle(1., Vec2::ZERO, 1.).expect("Valid");
        let b = world.add_circle(1., Vec2::new(start, 0.), 1.).expect("Valid");

        world.update(1. / 60.);

        let distance = position(&world, a).distance(position(&world, b));
        if popped {
            assert!(distance >= 2., "{start} should be popped out, ended at {distance}");
        } else {
            assert_relative_eq!(distance, start);
        }
    }
}

#[test]
fn free_flight_is_exact() {
    let mut world = World::new();
    let gravity = Vec2::new(0., -10.);
    world.set_gravity(gravity);
    let start = Vec2::new(1., 2.);
    let initial_velocity = Vec2::new(3., -1.);
    let handle = ball(&mut world, 0.5, start, initial_velocity);
    // far away, never touched
    ball(&mut world, 0.5, Vec2::new(100., 100.), Vec2::ZERO);

    let dt = 0.1;
    world.update(dt);

    let expected_velocity = initial_velocity + gravity * dt;
    assert_relative_eq!(velocity(&world, handle).x, expected_velocity.x);
    assert_relative_eq!(velocity(&world, handle).y, expected_velocity.y);
    let expected = start + expected_velocity * dt;
    assert_relative_eq!(position(&world, handle).x, expected.x);
    assert_relative_eq!(position(&world, handle).y, expected.y);
}

#[test]
fn zero_and_negative_updates_change_nothing() {
    let mut world = World::new();
    world.set_gravity(Vec2::new(0., -10.));
    let a = ball(&mut world, 1., Vec2::ZERO, Vec2::X);
    let b = ball(&mut world, 1., Vec2::new(1.5, 0.), Vec2::ZERO);
    let released = ball(&mut world, 1., Vec2::new(10., 0.), Vec2::ZERO);
    world.release(released);

    world.update(0.);
    world.update(-1.);

    assert_eq!(position(&world, a), Vec2::ZERO);
    assert_eq!(velocity(&world, a), Vec2::X);
    // overlapping but not popped out
    assert_eq!(position(&world, b), Vec2::new(1.5, 0.));
    assert!(world.contains(released));
}

#[test]
fn ball_dropped_on_box_bounces_at_half_speed() {
    const DT: f32 = 1. / 60.;

    let mut world = World::new();
    world.set_gravity(Vec2::new(0., -10.));
    world.insert(Body::rect(10., 1., Vec2::ZERO, 1.).expect("Valid")
        .with_flags(BodyFlags::ANCHORED)
        .with_material(Material { elasticity: 0.5, friction: 0.5 }));
    let ball = world.insert(Body::circle(0.5, Vec2::new(0., 10.), 1.).expect("Valid")
        .with_material(Material { elasticity: 0.5, friction: 0. }));

    let mut lowest = f32::INFINITY;
    let mut bounce = None;
    for _ in 0..600 {
        let before = velocity(&world, ball).y;
        world.update(DT);
        let after = velocity(&world, ball).y;
        lowest = lowest.min(position(&world, ball).y);

        if bounce.is_none() && after > 0. {
            let impact_speed = before + world.gravity().y * DT;
            bounce = Some((impact_speed, after));
        }
    }

    let (impact_speed, rebound) = bounce.expect("The ball should bounce");
    assert!(impact_speed < -10.);
    assert_relative_eq!(rebound / -impact_speed, 0.5, epsilon = 1e-3);
    assert!(lowest >= 1. - 1e-3, "Ball went down to {lowest}");
    assert_relative_eq!(position(&world, ball).x, 0.);
}

#[test]
fn simultaneous_contacts_resolve_in_one_update() {
    let mut world = World::new();
    let left = ball(&mut world, 1., Vec2::new(-2., 0.), Vec2::X);
    let middle = ball(&mut world, 1., Vec2::ZERO, Vec2::ZERO);
    let right = ball(&mut world, 1., Vec2::new(2., 0.), Vec2::ZERO);

    let responses = Rc::new(Cell::new((0, 0)));
    {
        let responses = Rc::clone(&responses);
        world.body_mut(middle).expect("Exists").on_responded(move |_| {
            let (middle, right) = responses.get();
            responses.set((middle + 1, right));
        });
    }
    {
        let responses = Rc::clone(&responses);
        world.body_mut(right).expect("Exists").on_responded(move |_| {
            let (middle, right) = responses.get();
            responses.set((middle, right + 1));
        });
    }

    world.update(1. / 60.);

    let (middle_responses, right_responses) = responses.get();
    assert!(middle_responses >= 1);
    assert!(right_responses >= 1);
    assert!(velocity(&world, right).x > 0.);
    assert_relative_eq!(velocity(&world, right).x, 1., epsilon = 1e-5);
    assert_relative_eq!(velocity(&world, left).x, 0., epsilon = 1e-5);
}

#[test]
fn vetoed_collision_passes_through() {
    let mut world = World::new();
    let platform = world.insert(Body::rect(4., 0.5, Vec2::ZERO, 1.).expect("Valid")
        .with_flags(BodyFlags::ANCHORED));
    // one-way platform, only stops things falling on it
    world.body_mut(platform).expect("Exists").on_collided(|result| result.normal.y < 0.);
    let jumper = ball(&mut world, 0.5, Vec2::new(0., -2.), Vec2::new(0., 4.));

    for _ in 0..60 {
        world.update(1. / 60.);
    }

    assert!(position(&world, jumper).y > 1.);
    assert_relative_eq!(velocity(&world, jumper).y, 4.);
    assert_eq!(world.body(jumper).expect("Exists").touching(), Some(platform));
}

#[test]
fn released_bodies_are_pruned_before_the_next_step() {
    let mut world = World::new();
    let target = ball(&mut world, 1., Vec2::new(2.5, 0.), Vec2::ZERO);
    let bullet = ball(&mut world, 0.25, Vec2::ZERO, Vec2::X * 60.);

    let hit = Rc::new(Cell::new(false));
    {
        let hit = Rc::clone(&hit);
        world.body_mut(target).expect("Exists").on_collided(move |_| {
            hit.set(true);
            true
        });
    }
    world.release(bullet);

    // first update prunes it before it can hit anything
    world.update(1. / 60.);
    assert!(!world.contains(bullet));
    assert!(!hit.get());
    assert_eq!(velocity(&world, target), Vec2::ZERO);
}
