use eframe::egui::{self, Align, Color32, Layout, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::bubbles::{ContainmentMode, SortMethod};
use crate::gifts::{Freshness, ItemStatus, PricedItem};
use crate::util::format_usd;

use super::super::ViewModel;
use super::super::render_utils::{DOWN_COLOR, UP_COLOR};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn freshness_color(freshness: Freshness) -> Color32 {
    match freshness {
        Freshness::Live => Color32::from_rgb(52, 211, 153),
        Freshness::Cache => Color32::from_rgb(96, 165, 250),
        Freshness::Stale => Color32::from_rgb(250, 204, 21),
        Freshness::Placeholder => Color32::from_rgb(248, 113, 113),
    }
}

/// Indices of `items` matching `query`, best match first. An empty query keeps input order.
fn filtered_indices(items: &[PricedItem], query: &str) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return (0..items.len()).collect();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let by_name = fuzzy_match_score(&matcher, &item.display_name, query);
            let by_model = fuzzy_match_score(&matcher, &item.model_name, query);
            by_name.max(by_model).map(|score| (index, score))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(index, _)| index).collect()
}

impl ViewModel {
    pub(in crate::app) fn draw_top_bar(
        &mut self,
        ui: &mut Ui,
        refresh_requested: &mut bool,
        is_refreshing: bool,
    ) {
        ui.horizontal(|ui| {
            ui.heading("Gift Bubbles");
            ui.separator();

            let filter_label = if self.show_filter { "Hide filter" } else { "Filter" };
            if ui.selectable_label(self.show_filter, filter_label).clicked() {
                self.show_filter = !self.show_filter;
            }

            let (up, down) = self.snapshot.movers();
            ui.label(RichText::new(format!("▲ {up}")).color(UP_COLOR));
            ui.label(RichText::new(format!("▼ {down}")).color(DOWN_COLOR));
            ui.separator();

            let sort_before = self.sort;
            egui::ComboBox::from_id_salt("sort_method")
                .selected_text(self.sort.label())
                .show_ui(ui, |ui| {
                    for method in SortMethod::ALL {
                        ui.selectable_value(&mut self.sort, method, method.label());
                    }
                });
            if self.sort != sort_before {
                self.layout_dirty = true;
            }

            let mut containment = self.layout.containment();
            egui::ComboBox::from_id_salt("containment_mode")
                .selected_text(containment.label())
                .show_ui(ui, |ui| {
                    for mode in ContainmentMode::ALL {
                        ui.selectable_value(&mut containment, mode, mode.label());
                    }
                });
            if containment != self.layout.containment() {
                self.layout.set_containment(containment);
                self.layout_dirty = true;
            }

            let refresh_button = ui.add_enabled(!is_refreshing, egui::Button::new("Refresh"));
            if refresh_button.clicked() {
                *refresh_requested = true;
            }
            if is_refreshing {
                ui.spinner();
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let freshness = self.snapshot.freshness;
                ui.label(
                    RichText::new(freshness.label())
                        .small()
                        .color(freshness_color(freshness)),
                );
                if self.snapshot.has_placeholder_data {
                    ui.label(
                        RichText::new("⚠ some prices are unavailable")
                            .small()
                            .color(Color32::from_rgb(250, 204, 21)),
                    );
                }
                let error = self
                    .refresh_error
                    .as_deref()
                    .or(self.snapshot.error.as_deref())
                    .or(self.collections.error.as_deref());
                if let Some(error) = error {
                    ui.label(RichText::new("error").small().color(DOWN_COLOR))
                        .on_hover_text(error);
                }
            });
        });
    }

    pub(in crate::app) fn draw_filter(&mut self, ui: &mut Ui, is_loading: bool) {
        ui.heading("Gifts");
        ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("Search gifts")
                .desired_width(f32::INFINITY),
        );

        ui.horizontal(|ui| {
            if ui.button("Select all").clicked() {
                self.selected_ids = self
                    .snapshot
                    .items
                    .iter()
                    .map(|item| item.id.clone())
                    .collect();
                self.layout_dirty = true;
            }
            if ui.button("Select none").clicked() {
                self.selected_ids.clear();
                self.layout_dirty = true;
            }
            ui.label(format!(
                "{}/{}",
                self.selected_ids.len(),
                self.snapshot.items.len()
            ));
        });
        ui.separator();

        let indices = filtered_indices(&self.snapshot.items, &self.search);
        if indices.is_empty() {
            ui.label("No gifts match the search.");
            return;
        }

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for index in indices {
                    let Some(item) = self.snapshot.items.get(index) else {
                        continue;
                    };

                    if is_loading || !item.is_loaded() {
                        Self::draw_skeleton_row(ui, item, is_loading);
                        continue;
                    }

                    let mut checked = self.selected_ids.contains(&item.id);
                    let row = ui.horizontal(|ui| {
                        let toggled = ui.checkbox(&mut checked, &item.display_name).changed();
                        ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                            ui.label(RichText::new(format_usd(item.price_usd)).monospace());
                        });
                        toggled
                    });
                    if row.inner {
                        if checked {
                            self.selected_ids.insert(item.id.clone());
                        } else {
                            self.selected_ids.remove(&item.id);
                        }
                        self.layout_dirty = true;
                    }
                }
            });
    }

    fn draw_skeleton_row(ui: &mut Ui, item: &PricedItem, is_loading: bool) {
        let status = if is_loading {
            "loading"
        } else if item.status == ItemStatus::Failed {
            "unavailable"
        } else {
            "pending"
        };

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
            ui.painter()
                .rect_filled(rect, 3.0, ui.visuals().widgets.inactive.bg_fill);
            ui.label(RichText::new(&item.display_name).weak());
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(RichText::new(status).small().italics().weak());
            });
        });
    }
}
