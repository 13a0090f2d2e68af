use eframe::egui::{Pos2, Vec2};
use serde::Deserialize;

use super::forces::{BoundaryForce, CenterForce, ChargeForce, CollisionForce, Force, PullForce};
use super::{Bubble, ContainmentMode, Viewport};

/// Physics constants for a layout run. Every field has a TOML override.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationTuning {
    pub alpha_decay: f32,
    pub alpha_min: f32,
    pub velocity_decay: f32,
    /// Starting alpha when surviving bubbles keep their positions.
    pub warm_alpha: f32,
    pub drag_alpha_target: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    pub charge_coefficient: f32,
    pub charge_exponent: f32,
    pub boundary_strength: f32,
    pub sentinel_pull: f32,
    pub bubble_pull: f32,
}

impl Default for SimulationTuning {
    fn default() -> Self {
        Self {
            alpha_decay: 0.02,
            alpha_min: 0.001,
            velocity_decay: 0.4,
            warm_alpha: 0.5,
            drag_alpha_target: 0.3,
            collision_padding: 2.0,
            collision_strength: 0.7,
            charge_coefficient: 0.2,
            charge_exponent: 1.5,
            boundary_strength: 0.2,
            sentinel_pull: 1.0,
            bubble_pull: 0.15,
        }
    }
}

pub(super) struct Simulation {
    bubbles: Vec<Bubble>,
    forces: Vec<Box<dyn Force>>,
    alpha: f32,
    alpha_target: f32,
    alpha_decay: f32,
    alpha_min: f32,
    velocity_decay: f32,
    ticks: u64,
}

impl Simulation {
    pub(super) fn new(bubbles: Vec<Bubble>, tuning: &SimulationTuning, alpha: f32) -> Self {
        Self {
            bubbles,
            forces: Vec::new(),
            alpha: alpha.clamp(0.0, 1.0),
            alpha_target: 0.0,
            alpha_decay: tuning.alpha_decay.clamp(0.0, 1.0),
            alpha_min: tuning.alpha_min.max(0.0),
            velocity_decay: tuning.velocity_decay.clamp(0.0, 1.0),
            ticks: 0,
        }
    }

    /// Builds a run with the force set for `mode`.
    pub(super) fn for_containment(
        bubbles: Vec<Bubble>,
        tuning: &SimulationTuning,
        viewport: Viewport,
        mode: ContainmentMode,
        alpha: f32,
    ) -> Self {
        let mut simulation = Self::new(bubbles, tuning, alpha);
        simulation.add_force(CollisionForce::new(
            tuning.collision_padding,
            tuning.collision_strength,
        ));
        simulation.add_force(ChargeForce::new(
            tuning.charge_coefficient,
            tuning.charge_exponent,
        ));
        if mode == ContainmentMode::CenterPull {
            simulation.add_force(CenterForce::new(viewport.center()));
            simulation.add_force(PullForce::new(
                viewport.center(),
                tuning.sentinel_pull,
                tuning.bubble_pull,
            ));
        }
        // Only nodes crossing an edge are pushed, so it is inert for a centred pack.
        simulation.add_force(BoundaryForce::new(
            viewport,
            tuning.collision_padding,
            tuning.boundary_strength,
        ));
        simulation
    }

    pub(super) fn add_force(&mut self, mut force: impl Force + 'static) {
        force.initialize(&self.bubbles);
        self.forces.push(Box::new(force));
    }

    /// Advances one step. Returns `false` once alpha has dropped below the stop threshold.
    pub(super) fn tick(&mut self) -> bool {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        for force in &mut self.forces {
            force.apply(&mut self.bubbles, self.alpha);
        }

        let keep = 1.0 - self.velocity_decay;
        for bubble in &mut self.bubbles {
            let node = &mut bubble.node;
            if let Some(pin) = node.pinned {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity *= keep;
            let next = node.position + node.velocity;
            if next.x.is_finite() && next.y.is_finite() {
                node.position = next;
            } else {
                node.velocity = Vec2::ZERO;
            }
        }

        self.ticks += 1;
        !self.is_cool()
    }

    pub(super) fn is_cool(&self) -> bool {
        self.alpha < self.alpha_min
    }

    pub(super) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(super) fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub(super) fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(super) fn pin(&mut self, index: usize, position: Pos2) {
        if let Some(bubble) = self.bubbles.get_mut(index) {
            bubble.node.pinned = Some(position);
        }
    }

    pub(super) fn release(&mut self, index: usize) {
        if let Some(bubble) = self.bubbles.get_mut(index) {
            bubble.node.pinned = None;
        }
    }

    pub(super) fn into_bubbles(self) -> Vec<Bubble> {
        self.bubbles
    }

    pub(super) fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }
}
