use std::f64::consts::PI;

use super::Viewport;

const MIN_RADIUS_FRACTION: f32 = 0.03;
const MAX_RADIUS_FRACTION: f32 = 0.15;
const MAX_ITERATIONS: usize = 30;
const TOLERANCE: f64 = 0.01;
const SCALE_FLOOR: f64 = 1e-6;
const SCALE_CEILING: f64 = 1000.0;
/// Weight for a zero value that sits next to positive ones.
const FALLBACK_WEIGHT: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadiusBounds {
    pub min: f32,
    pub max: f32,
}

impl RadiusBounds {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let side = viewport.min_side().max(0.0);
        Self {
            min: (side * MIN_RADIUS_FRACTION).max(f32::EPSILON),
            max: (side * MAX_RADIUS_FRACTION).max(f32::EPSILON),
        }
    }

    fn clamp(self, radius: f64) -> f64 {
        radius.clamp(f64::from(self.min), f64::from(self.max))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SizingOutcome {
    pub radii: Vec<f32>,
    pub bounds: RadiusBounds,
    pub scale: f64,
    pub covered_area: f64,
    pub target_area: f64,
}

impl SizingOutcome {
    pub fn largest(&self) -> Option<f32> {
        self.radii.iter().copied().reduce(f32::max)
    }

    pub fn all_clamped(&self) -> bool {
        self.radii
            .iter()
            .all(|radius| *radius == self.bounds.min || *radius == self.bounds.max)
    }
}

fn covered_area(weights: &[f64], scale: f64, bounds: RadiusBounds) -> f64 {
    weights
        .iter()
        .map(|weight| {
            let radius = bounds.clamp((scale * weight).sqrt());
            PI * radius * radius
        })
        .sum()
}

/// Finds radii whose summed area approaches `target_coverage` of the viewport.
///
/// Radius is `clamp(sqrt(s * value))`; the scale `s` is bisected geometrically
/// around the unclamped solution, so the result depends only on the inputs.
pub fn solve_sizes(values: &[f64], viewport: Viewport, target_coverage: f64) -> SizingOutcome {
    let bounds = RadiusBounds::for_viewport(viewport);
    let target_area = target_coverage.clamp(0.0, 1.0) * viewport.area().max(0.0);
    let minimal = |scale: f64| SizingOutcome {
        radii: vec![bounds.min; values.len()],
        bounds,
        scale,
        covered_area: values.len() as f64 * PI * f64::from(bounds.min).powi(2),
        target_area,
    };

    if values.is_empty() {
        return SizingOutcome {
            radii: Vec::new(),
            bounds,
            scale: 0.0,
            covered_area: 0.0,
            target_area,
        };
    }

    let usable = |value: &f64| value.is_finite() && value.abs() > 0.0;
    if !values.iter().any(usable) || target_area <= 0.0 {
        return minimal(0.0);
    }

    let weights = values
        .iter()
        .map(|value| if usable(value) { value.abs() } else { FALLBACK_WEIGHT })
        .collect::<Vec<_>>();

    let total_weight = weights.iter().sum::<f64>();
    let base_scale = target_area / (PI * total_weight);
    let mut low = base_scale * SCALE_FLOOR;
    let mut high = base_scale * SCALE_CEILING;
    let mut scale = base_scale;

    for _ in 0..MAX_ITERATIONS {
        scale = (low * high).sqrt();
        let area = covered_area(&weights, scale, bounds);
        if ((area - target_area) / target_area).abs() <= TOLERANCE {
            break;
        }
        if area < target_area {
            low = scale;
        } else {
            high = scale;
        }
    }

    let radii = weights
        .iter()
        .map(|weight| bounds.clamp((scale * weight).sqrt()) as f32)
        .collect::<Vec<_>>();
    let covered_area = radii
        .iter()
        .map(|radius| PI * f64::from(*radius).powi(2))
        .sum();

    SizingOutcome {
        radii,
        bounds,
        scale,
        covered_area,
        target_area,
    }
}
