//! Scripted viewer path: a spiralling descent toward the surface.

use glam::{DQuat, DVec3};
use icotile_config::SimulationConfig;

/// Viewer positions for the configured descent.
#[derive(Debug, Clone)]
pub(crate) struct Flight {
    center: DVec3,
    start_direction: DVec3,
    start_distance: f64,
    end_distance: f64,
    orbit_radians: f64,
    steps: u32,
}

impl Flight {
    pub(crate) fn new(sim: &SimulationConfig, center: DVec3) -> Self {
        Self {
            center,
            start_direction: DVec3::new(0.3, 0.5, 1.0).normalize(),
            start_distance: sim.start_distance,
            end_distance: sim.end_distance,
            orbit_radians: sim.orbit_degrees.to_radians(),
            steps: sim.steps,
        }
    }

    /// Viewer position at frame `step`.
    ///
    /// Distance falls geometrically while the viewer orbits the Y axis.
    pub(crate) fn position(&self, step: u32) -> DVec3 {
        let t = if self.steps <= 1 {
            1.0
        } else {
            f64::from(step.min(self.steps - 1)) / f64::from(self.steps - 1)
        };
        let distance = if self.start_distance > 0.0 && self.end_distance > 0.0 {
            self.start_distance * (self.end_distance / self.start_distance).powf(t)
        } else {
            self.start_distance + (self.end_distance - self.start_distance) * t
        };
        let rotation = DQuat::from_rotation_y(self.orbit_radians * t);
        self.center + rotation * self.start_direction * distance
    }

    pub(crate) fn positions(&self) -> impl Iterator<Item = DVec3> + '_ {
        (0..self.steps).map(|step| self.position(step))
    }
}
