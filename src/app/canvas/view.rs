use std::time::Duration;

use eframe::egui::{
    self, Align2, Color32, FontId, Id, Order, Painter, Pos2, Rect, RichText, Sense, Ui, Vec2, vec2,
};

use crate::bubbles::{Bubble, LayoutInput, LayoutStatus, SENTINEL_LABEL, Viewport};
use crate::gifts::PLACEHOLDER_IMAGE;
use crate::util::{format_percent, format_ton, format_usd};

use super::super::ViewModel;
use super::super::render_utils::{
    BubblePalette, blend_color, change_color, draw_background, draw_bubble_fill,
};

const MIN_LABEL_RADIUS: f32 = 6.0;
const THUMBNAIL_FRACTION: f32 = 0.8;

fn draw_thumbnail(ui: &Ui, rect: Rect, uri: &str) {
    let rounding = rect.width() * 0.5;
    let image = egui::Image::new(uri)
        .corner_radius(rounding)
        .show_loading_spinner(false);
    let image = match image.load_for_size(ui.ctx(), rect.size()) {
        Ok(_) => image,
        Err(_) => egui::Image::new(PLACEHOLDER_IMAGE)
            .corner_radius(rounding)
            .show_loading_spinner(false),
    };
    image.paint_at(ui, rect);
}

impl ViewModel {
    pub(in crate::app) fn draw_canvas(&mut self, ui: &mut Ui, is_loading: bool) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        let now = ui.input(|input| input.time);
        if self
            .viewport
            .observe(Viewport::new(rect.width(), rect.height()), now)
            .is_some()
        {
            self.layout_dirty = true;
        }

        if self.layout_dirty
            && let Some(viewport) = self.viewport.current()
        {
            self.layout.relayout(LayoutInput {
                items: &self.snapshot.items,
                loading: is_loading,
                selected: &self.selected_ids,
                sort: self.sort,
                viewport,
            });
            self.layout_dirty = false;
        }

        let moving = self.layout.advance_frame();

        if is_loading {
            self.tooltip.clear();
            painter.text(
                rect.center() + vec2(0.0, 28.0),
                Align2::CENTER_TOP,
                "Loading gift prices...",
                FontId::proportional(16.0),
                Color32::from_gray(180),
            );
            ui.put(
                Rect::from_center_size(rect.center(), Vec2::splat(32.0)),
                egui::Spinner::new().size(32.0),
            );
            ui.ctx().request_repaint();
            return;
        }

        self.handle_canvas_pointer(ui, rect, &response, now);

        if self.layout.bubbles().is_empty() {
            if self.layout.status() == LayoutStatus::Idle && self.viewport.current().is_some() {
                painter.text(
                    rect.center(),
                    Align2::CENTER_CENTER,
                    "No data available",
                    FontId::proportional(18.0),
                    Color32::from_gray(150),
                );
            }
        } else {
            let hovered = response
                .hover_pos()
                .and_then(|pointer| self.layout.bubble_at((pointer - rect.min).to_pos2()));
            for (index, bubble) in self.layout.bubbles().iter().enumerate() {
                self.draw_bubble(ui, &painter, rect, bubble, hovered == Some(index), now);
            }
        }

        self.draw_tooltip(ui, now);
        self.request_canvas_repaint(ui, moving, now);
    }

    fn draw_bubble(
        &self,
        ui: &Ui,
        painter: &Painter,
        rect: Rect,
        bubble: &Bubble,
        hovered: bool,
        now: f64,
    ) {
        let center = rect.min + bubble.node.position.to_vec2();
        let radius = bubble.node.radius * self.pulse.scale(&bubble.item.id, now);
        if !radius.is_finite() || radius <= 0.0 {
            return;
        }

        let mut palette = BubblePalette::for_change(bubble.item.change_ratio, bubble.is_sentinel());
        if hovered && !bubble.is_sentinel() {
            palette.rim = blend_color(palette.rim, Color32::WHITE, 0.25);
        }
        draw_bubble_fill(painter, center, radius, palette);

        if radius < MIN_LABEL_RADIUS {
            return;
        }

        if bubble.is_sentinel() {
            painter.text(
                center,
                Align2::CENTER_CENTER,
                SENTINEL_LABEL,
                FontId::proportional(radius / 5.0),
                Color32::WHITE,
            );
            return;
        }

        let thumbnail = bubble.item.image_ref.as_deref().map(|uri| {
            let size = radius * THUMBNAIL_FRACTION;
            let thumb_rect =
                Rect::from_center_size(center - vec2(0.0, radius * 0.3), Vec2::splat(size));
            draw_thumbnail(ui, thumb_rect, uri);
            thumb_rect
        });

        let label_center = match thumbnail {
            Some(thumb_rect) => Pos2::new(center.x, thumb_rect.bottom() + radius * 0.18),
            None => center - vec2(0.0, radius * 0.1),
        };
        painter.text(
            label_center,
            Align2::CENTER_CENTER,
            &bubble.item.symbol_label,
            FontId::proportional(radius / 3.0),
            Color32::WHITE,
        );
        painter.text(
            label_center + vec2(0.0, radius * 0.3),
            Align2::CENTER_CENTER,
            format_percent(bubble.item.change_ratio),
            FontId::proportional((radius / 5.0).max(7.0)),
            change_color(bubble.item.change_ratio),
        );
    }

    fn draw_tooltip(&self, ui: &Ui, now: f64) {
        let Some(frame) = self.tooltip.frame(now) else {
            return;
        };
        let Some(item) = self
            .layout
            .bubbles()
            .iter()
            .map(|bubble| &bubble.item)
            .find(|item| item.id == frame.id)
        else {
            return;
        };

        egui::Area::new(Id::new("bubble_tooltip"))
            .order(Order::Tooltip)
            .interactable(false)
            .fixed_pos(frame.pointer + vec2(14.0, 14.0))
            .show(ui.ctx(), |ui| {
                ui.multiply_opacity(frame.opacity);
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.label(RichText::new(&item.display_name).strong());
                    ui.label(RichText::new(&item.symbol_label).monospace().weak());
                    ui.label(format!(
                        "{} · {}",
                        format_usd(item.price_usd),
                        format_ton(item.price_ton)
                    ));
                    ui.label(
                        RichText::new(format_percent(item.change_ratio))
                            .color(change_color(item.change_ratio)),
                    );
                    ui.label(
                        RichText::new(format!("value {:.2}", item.value()))
                            .small()
                            .weak(),
                    );
                });
            });
    }

    fn request_canvas_repaint(&self, ui: &Ui, moving: bool, now: f64) {
        let ctx = ui.ctx();
        if moving || self.layout.dragging().is_some() || self.pulse.is_running(now) {
            ctx.request_repaint();
            return;
        }

        let wakeup = [self.tooltip.next_wakeup(), self.viewport.next_wakeup()]
            .into_iter()
            .flatten()
            .min_by(f64::total_cmp);
        if let Some(at) = wakeup {
            ctx.request_repaint_after(Duration::from_secs_f64((at - now).max(0.0)));
        }
    }
}
