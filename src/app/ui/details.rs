use std::f32::consts::PI;

use eframe::egui::{
    self, Align, Align2, Color32, Context, FontId, Id, Layout, Pos2, RichText, Sense, Shape,
    Stroke, Ui, Vec2, pos2, vec2,
};

use crate::gifts::{PricePoint, Timeframe, sentiment, simulated_history};
use crate::util::{format_percent, format_ton, format_usd};

use super::super::ViewModel;
use super::super::render_utils::{blend_color, change_color};

const CHART_HEIGHT: f32 = 150.0;
const GAUGE_RADIUS: f32 = 40.0;
const GAUGE_WIDTH: f32 = 8.0;
const GAUGE_STEPS: usize = 32;

const FEAR: Color32 = Color32::from_rgb(239, 68, 68);
const NEUTRAL: Color32 = Color32::from_rgb(251, 191, 36);
const GREED: Color32 = Color32::from_rgb(34, 197, 94);
const CHART_LINE: Color32 = Color32::from_rgb(59, 130, 246);

/// Red to amber to green across `0.0..=1.0`.
fn gauge_color(t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        blend_color(FEAR, NEUTRAL, t * 2.0)
    } else {
        blend_color(NEUTRAL, GREED, (t - 0.5) * 2.0)
    }
}

/// Angle on the upper half circle: `0.0` points left, `1.0` points right.
fn gauge_angle(t: f32) -> f32 {
    PI + t.clamp(0.0, 1.0) * PI
}

/// Maps history points into `rect`, oldest on the left.
fn chart_points(points: &[PricePoint], rect: egui::Rect) -> Vec<Pos2> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    let (min, max) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), point| {
            (min.min(point.price), max.max(point.price))
        });
    let span_x = (last.offset_secs - first.offset_secs).max(f64::EPSILON);
    let span_y = (max - min).max(f64::EPSILON);

    points
        .iter()
        .map(|point| {
            let x = (point.offset_secs - first.offset_secs) / span_x;
            let y = (point.price - min) / span_y;
            pos2(
                rect.left() + x as f32 * rect.width(),
                rect.bottom() - y as f32 * rect.height(),
            )
        })
        .collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_detail_modal(&mut self, ctx: &Context) {
        let Some(detail) = self.detail.as_mut() else {
            return;
        };

        let mut close = false;
        let modal = egui::Modal::new(Id::new("gift_detail")).show(ctx, |ui| {
            ui.set_width(420.0);
            let item = &detail.item;

            ui.horizontal(|ui| {
                draw_sentiment_gauge(ui, sentiment(item.change()));
                ui.with_layout(Layout::top_down(Align::Max), |ui| {
                    if ui.button("✕").clicked() {
                        close = true;
                    }
                    ui.label(RichText::new(format_usd(item.price_usd)).size(20.0).strong());
                    ui.label(format_ton(item.price_ton));
                    ui.label(
                        RichText::new(format_percent(item.change_ratio))
                            .size(16.0)
                            .color(change_color(item.change_ratio)),
                    );
                });
            });
            ui.separator();

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(&item.display_name).strong());
                    egui::Grid::new("gift_detail_fields")
                        .num_columns(2)
                        .show(ui, |ui| {
                            ui.label("Model");
                            ui.label(&item.model_name);
                            ui.end_row();
                            if let Some(variant) = &item.variant_name {
                                ui.label("Variant");
                                ui.label(variant);
                                ui.end_row();
                            }
                            ui.label("Symbol");
                            ui.label(RichText::new(&item.symbol_label).monospace());
                            ui.end_row();
                        });
                });
                if let Some(uri) = item.image_ref.as_deref() {
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.add(
                            egui::Image::new(uri)
                                .fit_to_exact_size(Vec2::splat(80.0))
                                .corner_radius(40.0),
                        );
                    });
                }
            });
            ui.separator();

            let mut timeframe = detail.timeframe;
            ui.horizontal(|ui| {
                for candidate in Timeframe::ALL {
                    ui.selectable_value(&mut timeframe, candidate, candidate.label());
                }
            });
            if timeframe != detail.timeframe {
                detail.timeframe = timeframe;
                detail.history = simulated_history(detail.item.price_usd, timeframe);
            }

            draw_history_chart(ui, &detail.history);
        });

        if close || modal.should_close() {
            self.detail = None;
        }
    }
}

fn draw_sentiment_gauge(ui: &mut Ui, value: f32) {
    let size = vec2(GAUGE_RADIUS * 2.0 + 20.0, GAUGE_RADIUS + 34.0);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let center = pos2(rect.center().x, rect.top() + GAUGE_RADIUS + 8.0);
    let arc_radius = GAUGE_RADIUS - GAUGE_WIDTH * 0.5;

    let arc = |from: f32, to: f32| -> Vec<Pos2> {
        (0..=GAUGE_STEPS)
            .map(|step| {
                let t = from + (to - from) * step as f32 / GAUGE_STEPS as f32;
                let angle = gauge_angle(t);
                center + vec2(angle.cos(), angle.sin()) * arc_radius
            })
            .collect()
    };

    painter.add(Shape::line(
        arc(0.0, 1.0),
        Stroke::new(GAUGE_WIDTH, Color32::from_rgb(75, 85, 99)),
    ));
    for (step, segment) in arc(0.0, value).windows(2).enumerate() {
        let t = step as f32 / GAUGE_STEPS as f32 * value;
        painter.line_segment([segment[0], segment[1]], Stroke::new(GAUGE_WIDTH, gauge_color(t)));
    }

    let angle = gauge_angle(value);
    let needle = center + vec2(angle.cos(), angle.sin()) * (GAUGE_RADIUS - GAUGE_WIDTH - 5.0);
    painter.line_segment([center, needle], Stroke::new(2.0, Color32::WHITE));
    painter.circle_filled(center, 3.0, Color32::WHITE);

    painter.text(
        center + vec2(0.0, 10.0),
        Align2::CENTER_CENTER,
        format!("{:.0}", value * 100.0),
        FontId::proportional(16.0),
        Color32::WHITE,
    );
    painter.text(
        center + vec2(0.0, 22.0),
        Align2::CENTER_CENTER,
        "FEAR/GREED",
        FontId::proportional(9.0),
        Color32::from_gray(156),
    );
}

fn draw_history_chart(ui: &mut Ui, history: &[PricePoint]) {
    let (rect, response) =
        ui.allocate_exact_size(vec2(ui.available_width(), CHART_HEIGHT), Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, Color32::from_rgb(17, 24, 39));

    if history.len() < 2 {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No price history",
            FontId::proportional(13.0),
            Color32::from_gray(140),
        );
        return;
    }

    let plot = rect.shrink(8.0);
    let points = chart_points(history, plot);
    painter.add(Shape::line(points.clone(), Stroke::new(1.5, CHART_LINE)));

    if let Some(pointer) = response.hover_pos()
        && let Some((index, point)) = points
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1.x - pointer.x).abs().total_cmp(&(b.1.x - pointer.x).abs()))
        && let Some(sample) = history.get(index)
    {
        painter.circle_filled(*point, 3.0, Color32::WHITE);
        painter.text(
            *point - vec2(0.0, 8.0),
            Align2::CENTER_BOTTOM,
            format_usd(sample.price),
            FontId::proportional(11.0),
            Color32::WHITE,
        );
    }
}
