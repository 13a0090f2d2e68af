use eframe::egui::{Align, Layout, RichText, Ui};

use crate::bubbles::LayoutStatus;
use crate::util::{format_ton, format_usd};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_footer(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let ton = self
                .snapshot
                .ton_price
                .map(format_usd)
                .unwrap_or_else(|| "$—".to_owned());
            ui.label(RichText::new(format!("TON {ton}")).small());
            ui.separator();

            match self.snapshot.cheapest() {
                Some(item) => ui.label(
                    RichText::new(format!(
                        "Cheapest: {} {} ({})",
                        item.display_name,
                        format_usd(item.price_usd),
                        format_ton(item.price_ton)
                    ))
                    .small(),
                ),
                None => ui.label(RichText::new("Cheapest: —").small().weak()),
            };

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                let layout = match (self.layout.status(), self.layout.alpha()) {
                    (LayoutStatus::Running, Some(alpha)) => format!("layout α {alpha:.3}"),
                    (LayoutStatus::Settled, _) => "layout settled".to_owned(),
                    (LayoutStatus::Initializing, _) => "layout starting".to_owned(),
                    (LayoutStatus::Idle | LayoutStatus::Running, _) => "layout idle".to_owned(),
                    (LayoutStatus::Disposed, _) => "layout stopped".to_owned(),
                };
                ui.label(RichText::new(layout).small().weak());
                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "{} collections · {}",
                        self.collections.names.len(),
                        self.collections.freshness.label()
                    ))
                    .small()
                    .weak(),
                );
            });
        });
    }
}
