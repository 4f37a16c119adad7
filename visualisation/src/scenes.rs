use std::{ cell::Cell, rc::Rc };

use arcade_physics::{ Body, BodyFlags, Material, World };
use macroquad::prelude::{ Rect, Vec2 };
use rand::{ Rng, SeedableRng };

/// Hit counter shown on trigger zones
pub type TriggerCount = Rc<Cell<u32>>;

const HINGE_STIFFNESS: f32 = 200.;
const HINGE_DAMPING: f32 = 20.;

/// Keeps a body's origin pinned to the given point, it can only rotate
pub struct Hinge(pub Vec2);

pub trait Scene {
    fn name(&self) -> &'static str;
    fn build(&self, world: &mut World);

    fn gravity(&self) -> Vec2 {
        Vec2::new(0., -10.)
    }

    /// Area of the world the camera starts on
    fn view(&self) -> Rect {
        Rect::new(-10., -2., 20., 16.)
    }

    /// Called before every world update, after user input
    fn before_update(&self, world: &mut World) {
        let hinged = world.bodies()
            .filter_map(|(handle, body)| body.parent::<Hinge>().map(|hinge| (handle, hinge.0)))
            .collect::<Vec<_>>();
        for (handle, pivot) in hinged {
            let Some(body) = world.body_mut(handle)
            else { continue };
            body.position = pivot;
            body.velocity = Vec2::ZERO;
            // spring back to the closed position
            body.apply_torque(-body.angle * HINGE_STIFFNESS - body.angular_velocity * HINGE_DAMPING);
        }
    }
}

fn anchored_rect(world: &mut World, width: f32, height: f32, position: Vec2) {
    let body = Body::rect(width, height, position, 1.).expect("Scene rectangles are valid")
        .with_flags(BodyFlags::ANCHORED);
    world.insert(body);
}

pub struct DropOnBox;

impl Scene for DropOnBox {
    fn name(&self) -> &'static str {
        "Ball dropped on a box"
    }

    fn build(&self, world: &mut World) {
        anchored_rect(world, 10., 1., Vec2::ZERO);
        world.insert(Body::circle(0.5, Vec2::new(0., 10.), 1.).expect("Valid ball")
            .with_material(Material { elasticity: 0.5, friction: 0. }));
        world.insert(Body::circle(0.5, Vec2::new(3., 12.), 1.).expect("Valid ball")
            .with_velocity(Vec2::new(-1., 0.)));
    }
}

pub struct RowOfCircles {
    count: usize,
}

impl Scene for RowOfCircles {
    fn name(&self) -> &'static str {
        "Row of touching circles"
    }

    fn gravity(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn view(&self) -> Rect {
        Rect::new(-6., -5., 20., 10.)
    }

    fn build(&self, world: &mut World) {
        let material = Material { elasticity: 1., friction: 0. };
        for i in 0..self.count {
            let velocity = if i == 0 { Vec2::new(4., 0.) } else { Vec2::ZERO };
            world.insert(Body::circle(1., Vec2::new(i as f32 * 2. - 4., 0.), 1.).expect("Valid circle")
                .with_velocity(velocity)
                .with_material(material));
        }
    }
}

pub struct TriggerZone;

impl Scene for TriggerZone {
    fn name(&self) -> &'static str {
        "Ghost trigger zone"
    }

    fn build(&self, world: &mut World) {
        anchored_rect(world, 16., 1., Vec2::ZERO);

        let count = TriggerCount::default();
        let mut zone = Body::rect(4., 4., Vec2::new(0., 5.), 1.).expect("Valid zone")
            .with_flags(BodyFlags::ANCHORED | BodyFlags::GHOST);
        zone.set_parent(Rc::clone(&count));
        zone.on_collided(move |_| {
            count.set(count.get() + 1);
            true
        });
        world.insert(zone);

        for i in 0..5 {
            world.insert(Body::circle(0.4, Vec2::new(i as f32 * 1.2 - 2.4, 9. + i as f32), 1.).expect("Valid ball"));
        }
    }
}

pub struct HingedDoor;

impl Scene for HingedDoor {
    fn name(&self) -> &'static str {
        "Hinged door"
    }

    fn gravity(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn build(&self, world: &mut World) {
        let hinge = Vec2::new(0., 4.);
        let mut door = Body::rect(6., 0.5, hinge + Vec2::new(3., 0.), 20.).expect("Valid door");
        door.shift_pivot(Vec2::new(-3., 0.));
        door.set_parent(Hinge(hinge));
        world.insert(door);

        for i in 0..4 {
            world.insert(Body::circle(0.5, Vec2::new(1.5 + i as f32 * 1.3, 0.5 - i as f32 * 2.), 2.).expect("Valid ball")
                .with_velocity(Vec2::new(0., 3. + i as f32)));
        }
    }
}

pub struct BouncingCircles {
    seed: u64,
    name: &'static str,
}

impl Scene for BouncingCircles {
    fn name(&self) -> &'static str {
        self.name
    }

    fn gravity(&self) -> Vec2 {
        Vec2::ZERO
    }

    fn view(&self) -> Rect {
        Rect::new(-2., -2., 54., 54.)
    }

    fn build(&self, world: &mut World) {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(self.seed);

        anchored_rect(world, 52., 1., Vec2::new(25., -0.5));
        anchored_rect(world, 52., 1., Vec2::new(25., 50.5));
        anchored_rect(world, 1., 50., Vec2::new(-0.5, 25.));
        anchored_rect(world, 1., 50., Vec2::new(50.5, 25.));

        let material = Material { elasticity: 1., friction: 0. };
        let mut placed = Vec::<(Vec2, f32)>::new();
        while placed.len() < 15 {
            let position = Vec2::new(rng.random_range(4. ..46.), rng.random_range(4. ..46.));
            let radius = rng.random_range(1. ..3.);
            if placed.iter().any(|&(other, other_radius)| other.distance(position) < radius + other_radius) {
                continue;
            }
            placed.push((position, radius));

            let velocity = Vec2::new(rng.random_range(-1. ..1.), rng.random_range(-1. ..1.))
                .normalize_or_zero() * rng.random_range(3. ..20.);
            world.insert(Body::circle(radius, position, radius * radius).expect("Valid circle")
                .with_velocity(velocity)
                .with_material(material));
        }
    }
}

pub struct ConcaveCup;

impl Scene for ConcaveCup {
    fn name(&self) -> &'static str {
        "Concave cup"
    }

    fn build(&self, world: &mut World) {
        let cup = Body::polygon(vec![
            Vec2::new(-4., 0.),
            Vec2::new(4., 0.),
            Vec2::new(4., 4.),
            Vec2::new(3., 4.),
            Vec2::new(3., 1.),
            Vec2::new(-3., 1.),
            Vec2::new(-3., 4.),
            Vec2::new(-4., 4.),
        ], Vec2::ZERO, 1.).expect("Valid cup").with_flags(BodyFlags::ANCHORED);
        world.insert(cup);

        for i in 0..6 {
            world.insert(Body::circle(0.5, Vec2::new(-2.5 + i as f32, 8. + i as f32 * 0.7), 1.).expect("Valid ball")
                .with_velocity(Vec2::new(if i % 2 == 0 { 1. } else { -1. }, 0.)));
        }
    }
}

pub fn get_all_scenes() -> Vec<Box<dyn Scene>> {
    vec![
        Box::new(DropOnBox),
        Box::new(RowOfCircles { count: 5 }),
        Box::new(TriggerZone),
        Box::new(HingedDoor),
        Box::new(BouncingCircles {
            seed: 4444,
            name: "Bouncing circles 1",
        }),
        Box::new(BouncingCircles {
            seed: 4445,
            name: "Bouncing circles 2",
        }),
        Box::new(ConcaveCup),
    ]
}
