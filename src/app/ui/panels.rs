use std::collections::HashSet;

use eframe::egui::{self, Context};
use tracing::{debug, info};

use crate::bubbles::{
    ClickPulse, FrameTicker, HoverTooltip, LayoutController, SortMethod, ViewportController,
};
use crate::config::AppConfig;
use crate::gifts::{CollectionList, GiftSnapshot, PricedItem, simulated_history};

use super::super::{DetailState, ViewModel};

fn all_ids(snapshot: &GiftSnapshot) -> HashSet<String> {
    snapshot.items.iter().map(|item| item.id.clone()).collect()
}

impl ViewModel {
    pub(in crate::app) fn new(
        collections: CollectionList,
        snapshot: GiftSnapshot,
        config: &AppConfig,
    ) -> Self {
        info!(
            collections = collections.names.len(),
            gifts = snapshot.items.len(),
            freshness = snapshot.freshness.label(),
            "gift prices ready"
        );

        Self {
            selected_ids: all_ids(&snapshot),
            collections,
            snapshot,
            sort: SortMethod::Default,
            search: String::new(),
            show_filter: false,
            layout: LayoutController::new(
                FrameTicker::default(),
                config.layout.tuning,
                config.layout.containment,
                config.layout.target_coverage,
            ),
            viewport: ViewportController::default(),
            tooltip: HoverTooltip::default(),
            pulse: ClickPulse::default(),
            detail: None,
            layout_dirty: true,
            last_loading: false,
            refresh_error: None,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        refresh_requested: &mut bool,
        is_loading: bool,
        is_refreshing: bool,
    ) {
        if is_loading != self.last_loading {
            self.last_loading = is_loading;
            self.layout_dirty = true;
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| self.draw_top_bar(ui, refresh_requested, is_refreshing));

        egui::TopBottomPanel::bottom("footer")
            .resizable(false)
            .show(ctx, |ui| self.draw_footer(ui));

        if self.show_filter {
            egui::SidePanel::left("filter")
                .resizable(true)
                .default_width(300.0)
                .show(ctx, |ui| self.draw_filter(ui, is_loading));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_canvas(ui, is_loading));

        self.draw_detail_modal(ctx);
    }

    /// Replaces the snapshot in place so the running layout warm-starts from it.
    pub(in crate::app) fn apply_refresh(&mut self, snapshot: GiftSnapshot, manual: bool) {
        debug!(
            manual,
            gifts = snapshot.items.len(),
            freshness = snapshot.freshness.label(),
            "applying refreshed gift prices"
        );
        self.selected_ids = all_ids(&snapshot);
        if let Some(detail) = self.detail.as_mut()
            && let Some(item) = snapshot.items.iter().find(|item| item.id == detail.item.id)
        {
            detail.item = item.clone();
        }
        self.snapshot = snapshot;
        self.refresh_error = None;
        self.layout_dirty = true;
    }

    pub(in crate::app) fn open_detail(&mut self, item: PricedItem) {
        let timeframe = Default::default();
        let history = simulated_history(item.price_usd, timeframe);
        self.detail = Some(DetailState {
            item,
            timeframe,
            history,
        });
    }

    pub(in crate::app) fn dispose(&mut self) {
        self.layout.dispose();
        self.viewport.dispose();
        self.tooltip.clear();
    }
}
