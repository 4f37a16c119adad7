mod response;
use response::Response;

use crate::{
    collision, default, Body, BodyError, BodyHandle, BodyRef, CollisionResult, Detection,
    SimulationConfig,
};

use glam::Vec2;
use ordered_float::OrderedFloat as OF;
use slotmap::DenseSlotMap;
use tracing::{ debug, trace, warn };

/// Owns every body and steps them forward in time
#[derive(Debug, Default)]
pub struct World {
    bodies: DenseSlotMap<BodyHandle, Body>,
    gravity: Vec2,
    config: SimulationConfig,
    /// Incremented on every collision pass
    collision_index: u64,
    /// Pairs whose response got vetoed, they go through each other until
    /// they stop touching
    passing: Vec<(BodyHandle, BodyHandle)>,
}

impl World {
    pub fn new() -> Self {
        default()
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Acceleration applied to every non-anchored body from the next update on
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    pub fn insert(&mut self, body: Body) -> BodyHandle {
        self.bodies.insert(body)
    }

    pub fn add_circle(&mut self, radius: f32, position: Vec2, mass: f32) -> Result<BodyHandle, BodyError> {
        Ok(self.insert(Body::circle(radius, position, mass)?))
    }

    pub fn add_polygon(&mut self, vertices: impl Into<Vec<Vec2>>, position: Vec2, mass: f32) -> Result<BodyHandle, BodyError> {
        Ok(self.insert(Body::polygon(vertices, position, mass)?))
    }

    pub fn add_rect(&mut self, width: f32, height: f32, position: Vec2, mass: f32) -> Result<BodyHandle, BodyError> {
        Ok(self.insert(Body::rect(width, height, position, mass)?))
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(handle)
    }

    /// Same as [`Body::release`], the body is removed at the start of the next update.
    /// Returns false for unknown handles.
    pub fn release(&mut self, handle: BodyHandle) -> bool {
        let Some(body) = self.bodies.get_mut(handle)
        else { return false };
        body.release();
        true
    }

    /// Removes the body right away
    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        self.bodies.remove(handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.keys()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
        self.passing.clear();
    }

    /// Tests a single pair over the next `dt` seconds without changing anything.
    /// Returns `None` if any handle is unknown.
    pub fn detect(&self, a: BodyHandle, b: BodyHandle, dt: f32) -> Option<Detection> {
        if a == b {
            return Some(Detection::Miss);
        }
        let body_a = self.bodies.get(a)?;
        let body_b = self.bodies.get(b)?;
        Some(collision::detect(BodyRef::new(a, body_a), BodyRef::new(b, body_b), dt, &self.config))
    }

    /// Every body whose shape contains `point`
    pub fn bodies_at_point(&self, point: Vec2) -> impl Iterator<Item = BodyHandle> + '_ {
        self.bodies.iter()
            .filter(move |(_, body)| body.contains_point(point))
            .map(|(handle, _)| handle)
    }

    /// Moves the simulation `elapsed` seconds forward
    pub fn update(&mut self, elapsed: f32) {
        if !(elapsed > 0.) {
            return;
        }

        self.prune_released();
        let order = self.simulation_order();
        self.integrate_forces(elapsed);

        let mut time_left = elapsed;
        let mut substeps = 0;
        while time_left > 0. {
            if substeps == self.config.max_substeps {
                warn!(time_left, substeps, "Too many collision passes, dropping the rest of the step");
                break;
            }
            substeps += 1;

            let consumed = self.substep(&order, time_left);
            trace!(substeps, consumed, time_left, "Collision pass done");
            time_left -= consumed;
        }
    }

    fn prune_released(&mut self) {
        let before = self.bodies.len();
        self.bodies.retain(|_, body| !body.is_released());
        let pruned = before - self.bodies.len();
        if pruned > 0 {
            debug!(pruned, remaining = self.bodies.len(), "Removed released bodies");
        }
        let bodies = &self.bodies;
        self.passing.retain(|&(a, b)| bodies.contains_key(a) && bodies.contains_key(b));
    }

    /// Non-anchored bodies first, so pair loops can stop at the first anchored one
    fn simulation_order(&self) -> Vec<BodyHandle> {
        let mut order = self.bodies.iter()
            .map(|(handle, body)| (body.is_anchored(), handle))
            .collect::<Vec<_>>();
        order.sort_by_key(|&(anchored, _)| anchored);
        order.into_iter().map(|(_, handle)| handle).collect()
    }

    fn integrate_forces(&mut self, elapsed: f32) {
        let gravity = self.gravity;
        for body in self.bodies.values_mut().filter(|body| !body.is_anchored()) {
            body.velocity += (body.force / body.mass() + gravity) * elapsed;
            body.angular_velocity += body.torque / body.moment_of_inertia() * elapsed;
            body.force = Vec2::ZERO;
            body.torque = 0.;
        }
    }

    /// One collision pass, returns the amount of time simulated
    fn substep(&mut self, order: &[BodyHandle], time_left: f32) -> f32 {
        self.collision_index += 1;
        let generation = self.collision_index;
        for body in self.bodies.values_mut() {
            body.begin_generation();
        }

        let hits = self.find_hits(order, time_left);

        let Some(best_time) = hits.iter().map(|hit| OF(hit.time)).min().map(|time| time.0)
        else {
            self.advance_unmoved(order, time_left);
            return time_left;
        };

        let mut simultaneous = 0;
        for hit in hits.iter().filter(|hit| hit.time == best_time) {
            simultaneous += 1;
            for result in [*hit, hit.inverted()] {
                let Some(body) = self.bodies.get_mut(result.body_a)
                else { continue };
                // first pairing found wins, they all happen at the same time
                if body.last_result_in(generation).is_none() {
                    body.last_result = Some(result);
                    body.collision_index = generation;
                }
            }
        }
        trace!(best_time, simultaneous, "Earliest collisions");

        let impact_time = best_time * (1. - self.config.pullback);
        for &handle in order {
            let Some(result) = self.bodies.get(handle)
                .and_then(|body| body.last_result_in(generation))
                .copied()
            else { continue };

            for partner in [result.body_a, result.body_b] {
                if let Some(body) = self.bodies.get_mut(partner) && !body.moved {
                    if !body.is_anchored() {
                        body.advance(impact_time);
                    }
                    body.moved = true;
                }
            }
            if response::apply(&mut self.bodies, &result, &self.config) == Response::Vetoed {
                self.passing.push(pair_key(result.body_a, result.body_b));
            }
        }

        self.advance_unmoved(order, best_time);
        best_time
    }

    /// Tests every pair, applying popouts and notifying ghost overlaps on the way.
    /// Returns the hits that need a response.
    fn find_hits(&mut self, order: &[BodyHandle], time_left: f32) -> Vec<CollisionResult> {
        let mut hits = Vec::new();

        for (i, &handle_a) in order.iter().enumerate() {
            for &handle_b in &order[i + 1..] {
                let (Some(body_a), Some(body_b)) = (self.bodies.get(handle_a), self.bodies.get(handle_b))
                else { continue };
                if body_a.is_anchored() {
                    // only anchored bodies are left
                    return hits;
                }
                let ghost = body_a.is_ghost() || body_b.is_ghost();
                let pair = pair_key(handle_a, handle_b);
                let passing = self.passing.contains(&pair);

                let detection = collision::detect(
                    BodyRef::new(handle_a, body_a),
                    BodyRef::new(handle_b, body_b),
                    time_left,
                    &self.config,
                );
                match detection {
                    Detection::Miss if passing => {
                        trace!(a = ?handle_a, b = ?handle_b, "Vetoed pair separated");
                        self.passing.retain(|&other| other != pair);
                    },
                    Detection::Miss => (),
                    Detection::Popout(_) | Detection::Hit(_) if passing => (),
                    Detection::Popout(popout) => {
                        trace!(body = ?popout.body, position = ?popout.position, "Popout");
                        if let Some(body) = self.bodies.get_mut(popout.body) {
                            body.position = popout.position;
                        }
                    },
                    Detection::Hit(result) if ghost => {
                        trace!(a = ?result.body_a, b = ?result.body_b, "Ghost overlap");
                        if let Some([body_a, body_b]) = self.bodies.get_disjoint_mut([handle_a, handle_b]) {
                            body_a.notify_collided(&result);
                            body_b.notify_collided(&result.inverted());
                        }
                    },
                    Detection::Hit(result) => {
                        trace!(a = ?result.body_a, b = ?result.body_b, time = result.time, "Collision");
                        hits.push(result);
                    },
                }
            }
        }

        hits
    }

    fn advance_unmoved(&mut self, order: &[BodyHandle], dt: f32) {
        for &handle in order {
            let Some(body) = self.bodies.get_mut(handle)
            else { continue };
            if body.is_anchored() {
                break;
            }
            if !body.moved {
                body.advance(dt);
                body.moved = true;
            }
        }
    }
}

fn pair_key(a: BodyHandle, b: BodyHandle) -> (BodyHandle, BodyHandle) {
    if a < b { (a, b) } else { (b, a) }
}
