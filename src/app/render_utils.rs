use std::f32::consts::TAU;

use eframe::egui::{Color32, Mesh, Painter, Pos2, Rect, Shape, Stroke, pos2, vec2};

pub(super) const UP_COLOR: Color32 = Color32::from_rgb(52, 211, 153);
pub(super) const DOWN_COLOR: Color32 = Color32::from_rgb(239, 68, 68);

const GRADIENT_SEGMENTS: usize = 48;
const RING_FRACTION: f32 = 0.8;

/// Colors of one radial bubble fill, from the transparent center outwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct BubblePalette {
    pub ring: Color32,
    pub rim: Color32,
}

fn rgba(r: u8, g: u8, b: u8, alpha: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

impl BubblePalette {
    pub(super) fn gain() -> Self {
        Self {
            ring: rgba(22, 101, 52, 0.9),
            rim: rgba(52, 211, 153, 0.8),
        }
    }

    pub(super) fn loss() -> Self {
        Self {
            ring: rgba(153, 27, 27, 0.9),
            rim: rgba(239, 68, 68, 0.8),
        }
    }

    pub(super) fn sentinel() -> Self {
        Self {
            ring: rgba(21, 101, 192, 0.4),
            rim: rgba(0, 255, 255, 1.0),
        }
    }

    /// A missing or zero change reads as a gain.
    pub(super) fn for_change(change: Option<f64>, is_sentinel: bool) -> Self {
        if is_sentinel {
            Self::sentinel()
        } else if change.is_some_and(|change| change < 0.0) {
            Self::loss()
        } else {
            Self::gain()
        }
    }
}

pub(super) fn change_color(change: Option<f64>) -> Color32 {
    if change.is_some_and(|change| change < 0.0) {
        DOWN_COLOR
    } else {
        UP_COLOR
    }
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(19, 23, 29));

    let step = 56.0;
    let line = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 40));

    let mut x = rect.left() + step;
    while x < rect.right() {
        painter.line_segment([pos2(x, rect.top()), pos2(x, rect.bottom())], line);
        x += step;
    }

    let mut y = rect.top() + step;
    while y < rect.bottom() {
        painter.line_segment([pos2(rect.left(), y), pos2(rect.right(), y)], line);
        y += step;
    }
}

/// Triangle fan: transparent center, `ring` at 80% of the radius, `rim` at the edge.
pub(super) fn radial_gradient_mesh(center: Pos2, radius: f32, palette: BubblePalette) -> Mesh {
    let mut mesh = Mesh::default();
    if radius.is_nan() || radius <= 0.0 {
        return mesh;
    }

    mesh.colored_vertex(center, Color32::TRANSPARENT);
    for segment in 0..GRADIENT_SEGMENTS {
        let angle = segment as f32 / GRADIENT_SEGMENTS as f32 * TAU;
        let direction = vec2(angle.cos(), angle.sin());
        mesh.colored_vertex(center + direction * radius * RING_FRACTION, palette.ring);
        mesh.colored_vertex(center + direction * radius, palette.rim);
    }

    let segments = GRADIENT_SEGMENTS as u32;
    for segment in 0..segments {
        let next = (segment + 1) % segments;
        let ring = 1 + segment * 2;
        let rim = ring + 1;
        let next_ring = 1 + next * 2;
        let next_rim = next_ring + 1;

        mesh.add_triangle(0, ring, next_ring);
        mesh.add_triangle(ring, rim, next_rim);
        mesh.add_triangle(ring, next_rim, next_ring);
    }
    mesh
}

pub(super) fn draw_bubble_fill(painter: &Painter, center: Pos2, radius: f32, palette: BubblePalette) {
    painter.add(Shape::mesh(radial_gradient_mesh(center, radius, palette)));
    painter.circle_stroke(center, radius, Stroke::new(1.0, palette.rim));
}
