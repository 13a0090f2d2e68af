use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use eframe::egui::{self, Context};
use tracing::{info, warn};

use crate::bubbles::{ClickPulse, HoverTooltip, LayoutController, SortMethod, ViewportController};
use crate::config::{ApiConfig, AppConfig};
use crate::gifts::{
    CollectionList, GiftSnapshot, HttpPriceSource, MockPriceSource, PricePoint, PriceSource,
    PricedItem, Timeframe, load_collections, load_gifts,
};

mod canvas;
mod render_utils;
mod ui;

type LoadResult = std::result::Result<LoadedData, String>;

pub struct GiftBubblesApp {
    config: AppConfig,
    state: AppState,
    reload: Option<Reload>,
    next_refresh_at: Option<f64>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct Reload {
    rx: Receiver<LoadResult>,
    /// Manual reloads show the loading affordance; timed ones update in place.
    manual: bool,
}

struct LoadedData {
    collections: Option<CollectionList>,
    snapshot: GiftSnapshot,
}

struct ViewModel {
    collections: CollectionList,
    snapshot: GiftSnapshot,
    selected_ids: HashSet<String>,
    sort: SortMethod,
    search: String,
    show_filter: bool,
    layout: LayoutController,
    viewport: ViewportController,
    tooltip: HoverTooltip,
    pulse: ClickPulse,
    detail: Option<DetailState>,
    layout_dirty: bool,
    last_loading: bool,
    refresh_error: Option<String>,
}

struct DetailState {
    item: PricedItem,
    timeframe: Timeframe,
    history: Vec<PricePoint>,
}

fn next_refresh(api: &ApiConfig, now: f64) -> Option<f64> {
    api.refresh_interval()
        .map(|interval| now + interval.as_secs_f64())
}

fn open_price_source(api: &ApiConfig) -> Result<Box<dyn PriceSource>> {
    if api.use_mock {
        return Ok(Box::new(MockPriceSource));
    }
    Ok(Box::new(HttpPriceSource::new(&api.base_url, api.timeout())?))
}

impl GiftBubblesApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let state = Self::start_load(&config);
        Self {
            config,
            state,
            reload: None,
            next_refresh_at: None,
        }
    }

    /// Loads on a worker thread. `collections` skips the collection lookup on refresh.
    fn spawn_load(
        api: &ApiConfig,
        collections: Option<Vec<String>>,
        prefer_cache: bool,
    ) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let api = api.clone();

        thread::spawn(move || {
            let result = open_price_source(&api)
                .map(|source| {
                    info!(source = %source.describe(), prefer_cache, "loading gift prices");
                    match collections {
                        Some(names) => LoadedData {
                            snapshot: load_gifts(source.as_ref(), &names, prefer_cache),
                            collections: None,
                        },
                        None => {
                            let list = load_collections(source.as_ref());
                            LoadedData {
                                snapshot: load_gifts(source.as_ref(), &list.names, prefer_cache),
                                collections: Some(list),
                            }
                        }
                    }
                })
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(config: &AppConfig) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(&config.api, None, true),
        }
    }

    fn ready(&mut self, data: LoadedData, now: f64) -> AppState {
        self.next_refresh_at = next_refresh(&self.config.api, now);
        let Some(collections) = data.collections else {
            return AppState::Error("collection list missing from initial load".to_owned());
        };
        AppState::Ready(Box::new(ViewModel::new(
            collections,
            data.snapshot,
            &self.config,
        )))
    }
}

impl eframe::App for GiftBubblesApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|input| input.time);
        let mut transition: Option<LoadResult> = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                    Err(TryRecvError::Empty) => {
                        ctx.request_repaint_after(Duration::from_millis(100));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading gift prices...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load gift prices");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut refresh_requested = false;
                let manual_in_flight = self.reload.as_ref().is_some_and(|reload| reload.manual);
                model.show(
                    ctx,
                    &mut refresh_requested,
                    manual_in_flight,
                    self.reload.is_some(),
                );

                let timer_due = self.next_refresh_at.is_some_and(|at| now >= at);
                if self.reload.is_none() && (refresh_requested || timer_due) {
                    info!(manual = refresh_requested, "refreshing gift prices");
                    self.reload = Some(Reload {
                        rx: Self::spawn_load(
                            &self.config.api,
                            Some(model.collections.names.clone()),
                            refresh_requested,
                        ),
                        manual: refresh_requested,
                    });
                    self.next_refresh_at = None;
                }

                if let Some(reload) = self.reload.take() {
                    match reload.rx.try_recv() {
                        Ok(Ok(data)) => {
                            model.apply_refresh(data.snapshot, reload.manual);
                            ctx.request_repaint();
                            self.next_refresh_at = next_refresh(&self.config.api, now);
                        }
                        Ok(Err(error)) => {
                            warn!(error = %error, "gift price refresh failed");
                            model.refresh_error = Some(error);
                            self.next_refresh_at = next_refresh(&self.config.api, now);
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload = Some(reload);
                            ctx.request_repaint_after(Duration::from_millis(100));
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.refresh_error =
                                Some("Background load worker disconnected".to_owned());
                            self.next_refresh_at = next_refresh(&self.config.api, now);
                        }
                    }
                }

                if let Some(at) = self.next_refresh_at {
                    ctx.request_repaint_after(Duration::from_secs_f64((at - now).max(0.0)));
                }
            }
        }

        if retry {
            info!("retrying gift price load");
            self.state = Self::start_load(&self.config);
        }

        if let Some(result) = transition {
            self.state = match result {
                Ok(data) => self.ready(data, now),
                Err(error) => AppState::Error(error),
            };
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let AppState::Ready(model) = &mut self.state {
            model.dispose();
        }
    }
}
