use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::ViewModel;

fn to_layout_space(rect: Rect, screen: Pos2) -> Pos2 {
    (screen - rect.min).to_pos2()
}

impl ViewModel {
    /// Drag pins a bubble, click selects it, hover feeds the tooltip.
    pub(in crate::app) fn handle_canvas_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        now: f64,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            let origin = ui
                .input(|input| input.pointer.press_origin())
                .or_else(|| response.interact_pointer_pos());
            if let Some(index) =
                origin.and_then(|origin| self.layout.bubble_at(to_layout_space(rect, origin)))
            {
                self.layout.begin_drag(index);
                self.tooltip.clear();
            }
        }

        if self.layout.dragging().is_some() {
            if let Some(pointer) = response.interact_pointer_pos() {
                self.layout.drag_to(to_layout_space(rect, pointer));
            }
            if response.drag_stopped() || !ui.input(|input| input.pointer.primary_down()) {
                self.layout.end_drag();
            }
        }

        if response.clicked()
            && let Some(pointer) = response.interact_pointer_pos()
            && let Some(index) = self.layout.bubble_at(to_layout_space(rect, pointer))
        {
            self.select_bubble(index, now);
        }

        let pointer = response.hover_pos();
        let hovered = if self.layout.dragging().is_some() {
            None
        } else {
            pointer
                .and_then(|pointer| self.layout.bubble_at(to_layout_space(rect, pointer)))
                .and_then(|index| self.layout.bubbles().get(index))
                .filter(|bubble| !bubble.is_sentinel())
                .map(|bubble| bubble.item.id.clone())
        };
        self.tooltip.update(hovered.as_deref(), pointer, now);
    }

    fn select_bubble(&mut self, index: usize, now: f64) {
        let Some(bubble) = self.layout.bubbles().get(index) else {
            return;
        };
        if bubble.is_sentinel() {
            return;
        }

        let item = bubble.item.clone();
        self.pulse.trigger(&item.id, now);
        self.tooltip.clear();
        self.open_detail(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::pos2;

    #[test]
    fn screen_points_map_to_canvas_origin() {
        let rect = Rect::from_min_size(pos2(300.0, 40.0), egui::vec2(800.0, 600.0));
        assert_eq!(to_layout_space(rect, pos2(300.0, 40.0)), Pos2::ZERO);
        assert_eq!(to_layout_space(rect, pos2(700.0, 340.0)), pos2(400.0, 300.0));
    }
}
