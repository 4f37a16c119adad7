mod shape;
pub use shape::*;

use std::{ any::Any, fmt };

use crate::{ geometry, BodyError, CollisionResult };

use bitflags::bitflags;
use glam::Vec2;
use smallvec::SmallVec;
use typed_floats::StrictlyPositiveFinite;

slotmap::new_key_type! {
    /// Stable handle to a body registered in a [`World`](crate::World)
    pub struct BodyHandle;
}

bitflags! {
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BodyFlags: u8 {
        /// Infinite mass and inertia, never moved by the simulation
        const ANCHORED = 1 << 0;
        /// Reports collisions without any response
        const GHOST = 1 << 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Restitution, in `[0, 1]`
    pub elasticity: f32,
    /// Coulomb friction coefficient
    pub friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            elasticity: 0.5,
            friction: 0.5,
        }
    }
}

pub type CollidedHandler = Box<dyn FnMut(&CollisionResult) -> bool>;
pub type RespondedHandler = Box<dyn FnMut(&CollisionResult)>;

fn strictly_positive(value: f32) -> Option<f32> {
    StrictlyPositiveFinite::<f32>::new(value).ok().map(|value| value.get())
}

pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Radians, counter-clockwise
    pub angle: f32,
    pub angular_velocity: f32,
    /// Accumulated until the next [`World::update`](crate::World::update)
    pub force: Vec2,
    pub torque: f32,

    pub flags: BodyFlags,
    pub material: Material,

    mass: f32,
    moment_of_inertia: f32,
    shape: Shape,
    parent: Option<Box<dyn Any>>,
    released: bool,

    pub(crate) touching: Option<BodyHandle>,
    pub(crate) touch_normal: Vec2,

    /// Generation `last_result` was found in
    pub(crate) collision_index: u64,
    pub(crate) last_result: Option<CollisionResult>,
    /// Already advanced during the current generation
    pub(crate) moved: bool,
    /// Bodies already resolved against during the current generation
    pub(crate) collision_list: SmallVec<BodyHandle, 4>,

    collided: Vec<CollidedHandler>,
    responded: Vec<RespondedHandler>,
}

impl Body {
    fn new(shape: Shape, position: Vec2, mass: f32) -> Result<Self, BodyError> {
        let mass = strictly_positive(mass).ok_or(BodyError::InvalidMass(mass))?;
        let moment_of_inertia = shape.moment_of_inertia(mass);
        let moment_of_inertia = strictly_positive(moment_of_inertia)
            .ok_or(BodyError::InvalidMomentOfInertia(moment_of_inertia))?;

        Ok(Self {
            position,
            velocity: Vec2::ZERO,
            angle: 0.,
            angular_velocity: 0.,
            force: Vec2::ZERO,
            torque: 0.,

            flags: BodyFlags::empty(),
            material: Material::default(),

            mass,
            moment_of_inertia,
            shape,
            parent: None,
            released: false,

            touching: None,
            touch_normal: Vec2::ZERO,

            collision_index: 0,
            last_result: None,
            moved: false,
            collision_list: SmallVec::new(),

            collided: Vec::new(),
            responded: Vec::new(),
        })
    }

    pub fn circle(radius: f32, position: Vec2, mass: f32) -> Result<Self, BodyError> {
        let radius = strictly_positive(radius).ok_or(BodyError::InvalidRadius(radius))?;
        Self::new(Shape::Circle(Circle { radius }), position, mass)
    }

    /// `vertices` are in local space and counter-clockwise
    pub fn polygon(vertices: impl Into<Vec<Vec2>>, position: Vec2, mass: f32) -> Result<Self, BodyError> {
        let polygon = ConvexPolygon::try_new(vertices.into())?;
        Self::new(Shape::Polygon(polygon), position, mass)
    }

    /// Box of the given size centered on `position`
    pub fn rect(width: f32, height: f32, position: Vec2, mass: f32) -> Result<Self, BodyError> {
        if strictly_positive(width).is_none() || strictly_positive(height).is_none() {
            return Err(BodyError::InvalidDimensions { width, height });
        }
        Self::polygon(geometry::rect_vertices(width, height), position, mass)
    }

    pub fn with_flags(mut self, flags: BodyFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Also scales the moment of inertia so the shape's mass distribution is kept
    pub fn set_mass(&mut self, mass: f32) -> Result<(), BodyError> {
        let mass = strictly_positive(mass).ok_or(BodyError::InvalidMass(mass))?;
        self.moment_of_inertia *= mass / self.mass;
        self.mass = mass;
        Ok(())
    }

    pub fn moment_of_inertia(&self) -> f32 {
        self.moment_of_inertia
    }

    pub fn set_moment_of_inertia(&mut self, moment_of_inertia: f32) -> Result<(), BodyError> {
        self.moment_of_inertia = strictly_positive(moment_of_inertia)
            .ok_or(BodyError::InvalidMomentOfInertia(moment_of_inertia))?;
        Ok(())
    }

    pub fn is_anchored(&self) -> bool {
        self.flags.contains(BodyFlags::ANCHORED)
    }

    pub fn is_ghost(&self) -> bool {
        self.flags.contains(BodyFlags::GHOST)
    }

    /// Zero for anchored bodies whatever their mass
    pub fn inverse_mass(&self) -> f32 {
        if self.is_anchored() { 0. } else { 1. / self.mass }
    }

    /// Zero for anchored bodies whatever their moment of inertia
    pub fn inverse_inertia(&self) -> f32 {
        if self.is_anchored() { 0. } else { 1. / self.moment_of_inertia }
    }

    /// Velocity as seen by the collision tests, anchored bodies never move
    pub(crate) fn effective_velocity(&self) -> Vec2 {
        if self.is_anchored() { Vec2::ZERO } else { self.velocity }
    }

    pub(crate) fn effective_angular_velocity(&self) -> f32 {
        if self.is_anchored() { 0. } else { self.angular_velocity }
    }

    /// Velocity of a world-space point attached to this body
    pub fn point_velocity(&self, point: Vec2) -> Vec2 {
        let offset = point - self.position;
        self.effective_velocity() + geometry::perp(offset) * -self.effective_angular_velocity()
    }

    pub fn kinetic_energy(&self) -> f32 {
        if self.is_anchored() {
            return 0.;
        }
        0.5 * self.mass * self.velocity.length_squared()
            + 0.5 * self.moment_of_inertia * self.angular_velocity * self.angular_velocity
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    pub fn apply_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    pub(crate) fn advance(&mut self, dt: f32) {
        self.position += self.velocity * dt;
        self.angle += self.angular_velocity * dt;
    }

    pub fn radius(&self) -> Option<f32> {
        self.shape.as_circle().map(Circle::radius)
    }

    /// Local-space vertices, empty for circles
    pub fn vertices(&self) -> &[Vec2] {
        match &self.shape {
            Shape::Circle(_) => &[],
            Shape::Polygon(polygon) => polygon.vertices(),
        }
    }

    /// Re-shapes a polygon, the moment of inertia is kept.
    /// On error the previous vertices stay in place.
    pub fn set_vertices(&mut self, vertices: impl Into<Vec<Vec2>>) -> Result<(), BodyError> {
        let Shape::Polygon(polygon) = &mut self.shape
        else { return Err(BodyError::NotAPolygon) };
        *polygon = ConvexPolygon::try_new(vertices.into())?;
        Ok(())
    }

    pub fn world_vertices(&self) -> Vec<Vec2> {
        match &self.shape {
            Shape::Circle(_) => Vec::new(),
            Shape::Polygon(polygon) => polygon.world_vertices(self.position, self.angle),
        }
    }

    /// Moves the origin of a polygon to `local_pivot` without moving its
    /// vertices in the world, so it rotates around that point instead.
    /// Circles always pivot around their center.
    pub fn shift_pivot(&mut self, local_pivot: Vec2) {
        let Shape::Polygon(polygon) = &mut self.shape
        else { return };

        self.position += Vec2::from_angle(self.angle).rotate(local_pivot);
        for vertex in &mut polygon.vertices {
            *vertex -= local_pivot;
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        match &self.shape {
            Shape::Circle(circle) => point.distance_squared(self.position) < circle.radius * circle.radius,
            Shape::Polygon(polygon) if polygon.convex => {
                geometry::poly_contains(&self.world_vertices(), point)
            },
            Shape::Polygon(_) => geometry::crossing_contains(&self.world_vertices(), point),
        }
    }

    pub fn parent<T: Any>(&self) -> Option<&T> {
        self.parent.as_deref()?.downcast_ref()
    }

    pub fn parent_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.parent.as_deref_mut()?.downcast_mut()
    }

    /// Opaque back-reference to whatever owns this body
    pub fn set_parent<T: Any>(&mut self, parent: T) {
        self.parent = Some(Box::new(parent));
    }

    /// Last body this one was in contact with
    pub fn touching(&self) -> Option<BodyHandle> {
        self.touching
    }

    /// Normal of the last contact, pointing toward this body
    pub fn touch_normal(&self) -> Vec2 {
        self.touch_normal
    }

    /// Marks the body for removal, it stays in the world until the next update
    pub fn release(&mut self) {
        self.released = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Called before a collision response, returning `false` cancels the response.
    /// The result given to the handler always has this body as `body_a`.
    pub fn on_collided(&mut self, handler: impl FnMut(&CollisionResult) -> bool + 'static) {
        self.collided.push(Box::new(handler));
    }

    /// Called after a collision response has been applied
    pub fn on_responded(&mut self, handler: impl FnMut(&CollisionResult) + 'static) {
        self.responded.push(Box::new(handler));
    }

    /// Every handler is called, the response is allowed only if none of them refuses it
    pub(crate) fn notify_collided(&mut self, result: &CollisionResult) -> bool {
        self.collided.iter_mut()
            .fold(true, |allowed, handler| handler(result) && allowed)
    }

    pub(crate) fn notify_responded(&mut self, result: &CollisionResult) {
        for handler in &mut self.responded {
            handler(result);
        }
    }

    /// Resets the per-generation bookkeeping
    pub(crate) fn begin_generation(&mut self) {
        self.moved = false;
        self.collision_list.clear();
    }

    pub(crate) fn last_result_in(&self, collision_index: u64) -> Option<&CollisionResult> {
        self.last_result.as_ref()
            .filter(|_| self.collision_index == collision_index)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("angle", &self.angle)
            .field("angular_velocity", &self.angular_velocity)
            .field("mass", &self.mass)
            .field("moment_of_inertia", &self.moment_of_inertia)
            .field("flags", &self.flags)
            .field("material", &self.material)
            .field("shape", &self.shape)
            .field("released", &self.released)
            .field("touching", &self.touching)
            .finish_non_exhaustive()
    }
}
