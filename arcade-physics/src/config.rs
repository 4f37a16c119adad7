/// Tuning values of the simulation.
///
/// The defaults are the values the game was play-tested with, changing them
/// changes the feel of every collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Maximum number of collision passes in a single [`World::update`],
    /// any time left after that is dropped for the frame
    ///
    /// [`World::update`]: crate::World::update
    pub max_substeps: usize,
    /// Fraction of the time of impact given back before resolving a
    /// collision so bodies never end exactly on the contact surface
    pub pullback: f32,
    /// Two circles are considered overlapping when their squared distance is
    /// below this fraction of their squared summed radii
    pub penetration_threshold: f32,
    /// Overlapping bodies are pushed apart to this factor of their contact distance
    pub popout_separation: f32,
    /// Contact normal components smaller than this are snapped to zero
    pub axis_snap_epsilon: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_substeps: 10,
            pullback: 0.001,
            penetration_threshold: 0.95,
            popout_separation: 1.0001,
            axis_snap_epsilon: 1e-5,
        }
    }
}

impl SimulationConfig {
    pub fn with_max_substeps(self, max_substeps: usize) -> Self {
        Self { max_substeps, ..self }
    }

    pub fn with_pullback(self, pullback: f32) -> Self {
        Self { pullback, ..self }
    }

    pub fn with_penetration_threshold(self, penetration_threshold: f32) -> Self {
        Self { penetration_threshold, ..self }
    }

    pub fn with_popout_separation(self, popout_separation: f32) -> Self {
        Self { popout_separation, ..self }
    }

    pub fn with_axis_snap_epsilon(self, axis_snap_epsilon: f32) -> Self {
        Self { axis_snap_epsilon, ..self }
    }
}
