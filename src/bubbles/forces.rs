use eframe::egui::{Pos2, Vec2, vec2};

use super::quadtree::QuadNode;
use super::{Bubble, Viewport};

const BARNES_HUT_THETA: f32 = 0.9;
const MIN_DISTANCE_SQ: f32 = 1.0;

/// A force contributes velocity (or, for centering, position) changes each tick.
pub(super) trait Force {
    /// Called whenever the simulation's bubble set is (re)attached.
    fn initialize(&mut self, _bubbles: &[Bubble]) {}

    fn apply(&mut self, bubbles: &mut [Bubble], alpha: f32);
}

fn fallback_direction(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

pub(super) struct CollisionForce {
    padding: f32,
    strength: f32,
    radii: Vec<f32>,
    predicted: Vec<Pos2>,
    deltas: Vec<Vec2>,
}

impl CollisionForce {
    pub(super) fn new(padding: f32, strength: f32) -> Self {
        Self {
            padding,
            strength,
            radii: Vec::new(),
            predicted: Vec::new(),
            deltas: Vec::new(),
        }
    }
}

#[derive(Clone, Copy)]
struct CollisionParams {
    strength: f32,
    max_distance_sq: f32,
}

fn resolve_pair(
    from: usize,
    to: usize,
    positions: &[Pos2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let delta = positions[from] - positions[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    let distance = distance_sq.sqrt();
    let (direction, distance) = if distance > 0.0001 {
        (delta / distance, distance)
    } else {
        (fallback_direction(from, to), 0.0001)
    };

    let push = direction * (reach - distance) * params.strength;
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = to_sq / (from_sq + to_sq);
    deltas[from] += push * share;
    deltas[to] -= push * (1.0 - share);
}

fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    positions: &[Pos2],
    radii: &[f32],
    params: CollisionParams,
    deltas: &mut [Vec2],
) {
    if node_a.bounds.distance_sq_to(node_b.bounds) > params.max_distance_sq {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for i in 0..node_a.indices.len() {
                for j in (i + 1)..node_a.indices.len() {
                    resolve_pair(
                        node_a.indices[i],
                        node_a.indices[j],
                        positions,
                        radii,
                        params,
                        deltas,
                    );
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_pair(from, to, positions, radii, params, deltas);
                }
            }
        }
        return;
    }

    if same_node {
        for first in 0..4 {
            let Some(child_a) = node_a.children[first].as_ref() else {
                continue;
            };

            accumulate_collision_pairs(child_a, child_a, true, positions, radii, params, deltas);

            for second in (first + 1)..4 {
                let Some(child_b) = node_a.children[second].as_ref() else {
                    continue;
                };
                accumulate_collision_pairs(
                    child_a, child_b, false, positions, radii, params, deltas,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children.iter().flatten() {
            accumulate_collision_pairs(child, node_b, false, positions, radii, params, deltas);
        }
    } else {
        for child in node_b.children.iter().flatten() {
            accumulate_collision_pairs(node_a, child, false, positions, radii, params, deltas);
        }
    }
}

impl Force for CollisionForce {
    fn initialize(&mut self, bubbles: &[Bubble]) {
        self.radii.clear();
        self.radii
            .extend(bubbles.iter().map(|bubble| bubble.node.radius + self.padding));
    }

    fn apply(&mut self, bubbles: &mut [Bubble], _alpha: f32) {
        if bubbles.len() < 2 || self.radii.len() != bubbles.len() {
            return;
        }

        self.predicted.clear();
        self.predicted.extend(
            bubbles
                .iter()
                .map(|bubble| bubble.node.position + bubble.node.velocity),
        );
        self.deltas.clear();
        self.deltas.resize(bubbles.len(), Vec2::ZERO);

        let Some(tree) = QuadNode::build(&self.predicted, &[]) else {
            return;
        };
        let max_radius = self.radii.iter().copied().fold(0.0_f32, f32::max);
        let max_distance = max_radius * 2.0;
        let params = CollisionParams {
            strength: self.strength,
            max_distance_sq: max_distance * max_distance,
        };
        accumulate_collision_pairs(
            &tree,
            &tree,
            true,
            &self.predicted,
            &self.radii,
            params,
            &mut self.deltas,
        );

        for (bubble, delta) in bubbles.iter_mut().zip(&self.deltas) {
            bubble.node.velocity += *delta;
        }
    }
}

/// Many-body repulsion with a per-bubble strength derived from its radius.
pub(super) struct ChargeForce {
    coefficient: f32,
    exponent: f32,
    strengths: Vec<f32>,
    positions: Vec<Pos2>,
}

impl ChargeForce {
    pub(super) fn new(coefficient: f32, exponent: f32) -> Self {
        Self {
            coefficient,
            exponent,
            strengths: Vec::new(),
            positions: Vec::new(),
        }
    }

    pub(super) fn strength_for(&self, radius: f32) -> f32 {
        -radius.max(0.0).powf(self.exponent) * self.coefficient
    }
}

fn accumulate_charge(
    node: &QuadNode,
    index: usize,
    positions: &[Pos2],
    strengths: &[f32],
    alpha: f32,
    velocity: &mut Vec2,
) {
    if node.is_leaf() && node.indices.is_empty() {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other in &node.indices {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            let mut distance_sq = delta.length_sq();
            if distance_sq <= 0.000_001 {
                delta = fallback_direction(index, other);
                distance_sq = 1.0;
            }
            if distance_sq < MIN_DISTANCE_SQ {
                distance_sq = (MIN_DISTANCE_SQ * distance_sq).sqrt();
            }
            *velocity += delta * (strengths[other] * alpha / distance_sq);
        }
        return;
    }

    let delta = node.center_of_charge - point;
    let mut distance_sq = delta.length_sq().max(0.000_001);
    let side = node.bounds.side_length();
    let can_approximate =
        !node.bounds.contains(point) && side * side / (BARNES_HUT_THETA * BARNES_HUT_THETA) < distance_sq;

    if can_approximate {
        if distance_sq < MIN_DISTANCE_SQ {
            distance_sq = (MIN_DISTANCE_SQ * distance_sq).sqrt();
        }
        *velocity += delta * (node.charge * alpha / distance_sq);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_charge(child, index, positions, strengths, alpha, velocity);
    }
}

impl Force for ChargeForce {
    fn initialize(&mut self, bubbles: &[Bubble]) {
        self.strengths = bubbles
            .iter()
            .map(|bubble| self.strength_for(bubble.node.radius))
            .collect();
    }

    fn apply(&mut self, bubbles: &mut [Bubble], alpha: f32) {
        if bubbles.len() < 2 || self.strengths.len() != bubbles.len() {
            return;
        }

        self.positions.clear();
        self.positions
            .extend(bubbles.iter().map(|bubble| bubble.node.position));
        let Some(tree) = QuadNode::build(&self.positions, &self.strengths) else {
            return;
        };

        for (index, bubble) in bubbles.iter_mut().enumerate() {
            let mut velocity = Vec2::ZERO;
            accumulate_charge(
                &tree,
                index,
                &self.positions,
                &self.strengths,
                alpha,
                &mut velocity,
            );
            bubble.node.velocity += velocity;
        }
    }
}

/// Soft wall: pushes bubbles whose padded edge crosses the viewport back inside.
///
/// Proportional to penetration depth and independent of alpha, so it keeps
/// working after the run cools down.
pub(super) struct BoundaryForce {
    viewport: Viewport,
    padding: f32,
    strength: f32,
    radii: Vec<f32>,
}

impl BoundaryForce {
    pub(super) fn new(viewport: Viewport, padding: f32, strength: f32) -> Self {
        Self {
            viewport,
            padding,
            strength,
            radii: Vec::new(),
        }
    }
}

fn penetration(low_edge: f32, high_edge: f32, position: f32, reach: f32) -> f32 {
    if position - reach < low_edge {
        low_edge - (position - reach)
    } else if position + reach > high_edge {
        high_edge - (position + reach)
    } else {
        0.0
    }
}

impl Force for BoundaryForce {
    fn initialize(&mut self, bubbles: &[Bubble]) {
        self.radii.clear();
        self.radii
            .extend(bubbles.iter().map(|bubble| bubble.node.radius + self.padding));
    }

    fn apply(&mut self, bubbles: &mut [Bubble], _alpha: f32) {
        for (bubble, reach) in bubbles.iter_mut().zip(&self.radii) {
            let position = bubble.node.position;
            let push = vec2(
                penetration(0.0, self.viewport.width, position.x, *reach),
                penetration(0.0, self.viewport.height, position.y, *reach),
            );
            bubble.node.velocity += push * self.strength;
        }
    }
}

/// Translates the whole set so its mean position sits on the viewport center.
pub(super) struct CenterForce {
    target: Pos2,
}

impl CenterForce {
    pub(super) fn new(target: Pos2) -> Self {
        Self { target }
    }
}

impl Force for CenterForce {
    fn apply(&mut self, bubbles: &mut [Bubble], _alpha: f32) {
        if bubbles.is_empty() {
            return;
        }

        let sum = bubbles
            .iter()
            .fold(Vec2::ZERO, |sum, bubble| sum + bubble.node.position.to_vec2());
        let shift = self.target.to_vec2() - sum / bubbles.len() as f32;
        for bubble in bubbles {
            bubble.node.position += shift;
        }
    }
}

/// Per-bubble spring toward a point; the sentinel is held much tighter.
pub(super) struct PullForce {
    target: Pos2,
    sentinel_strength: f32,
    strength: f32,
    strengths: Vec<f32>,
}

impl PullForce {
    pub(super) fn new(target: Pos2, sentinel_strength: f32, strength: f32) -> Self {
        Self {
            target,
            sentinel_strength,
            strength,
            strengths: Vec::new(),
        }
    }
}

impl Force for PullForce {
    fn initialize(&mut self, bubbles: &[Bubble]) {
        self.strengths = bubbles
            .iter()
            .map(|bubble| {
                if bubble.is_sentinel() {
                    self.sentinel_strength
                } else {
                    self.strength
                }
            })
            .collect();
    }

    fn apply(&mut self, bubbles: &mut [Bubble], alpha: f32) {
        for (bubble, strength) in bubbles.iter_mut().zip(&self.strengths) {
            let offset = self.target - bubble.node.position;
            bubble.node.velocity += offset * (*strength * alpha);
        }
    }
}
