use std::collections::{HashMap, HashSet};
use std::f32::consts::PI;

use eframe::egui::{Pos2, vec2};
use tracing::{debug, info, warn};

use super::scheduler::{FrameTicker, RunId, TickHandle, TickScheduler};
use super::simulation::{Simulation, SimulationTuning};
use super::sizing::solve_sizes;
use super::{Bubble, ContainmentMode, LayoutNode, SortMethod, Viewport, sentinel_item};
use crate::gifts::PricedItem;
use crate::util::stable_pair;

const COLD_ALPHA: f32 = 1.0;
const SENTINEL_SCALE: f32 = 0.8;
const SENTINEL_DRIFT_TOLERANCE: f32 = 0.1;
const SEED_RADIUS: f32 = 10.0;
const SEED_JITTER: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutStatus {
    Idle,
    Initializing,
    Running,
    Settled,
    Disposed,
}

/// Everything a layout pass depends on.
#[derive(Clone, Copy)]
pub struct LayoutInput<'a> {
    pub items: &'a [PricedItem],
    pub loading: bool,
    pub selected: &'a HashSet<String>,
    pub sort: SortMethod,
    pub viewport: Viewport,
}

/// Owns the current simulation run and its tick subscription.
pub struct LayoutController<S: TickScheduler = FrameTicker> {
    scheduler: S,
    tuning: SimulationTuning,
    containment: ContainmentMode,
    target_coverage: f64,
    status: LayoutStatus,
    simulation: Option<Simulation>,
    run: Option<RunId>,
    active: Option<TickHandle>,
    runs_started: u64,
    viewport: Viewport,
    sentinel_radius: Option<f32>,
    dragging: Option<usize>,
}

impl<S: TickScheduler> LayoutController<S> {
    pub fn new(
        scheduler: S,
        tuning: SimulationTuning,
        containment: ContainmentMode,
        target_coverage: f64,
    ) -> Self {
        Self {
            scheduler,
            tuning,
            containment,
            target_coverage,
            status: LayoutStatus::Idle,
            simulation: None,
            run: None,
            active: None,
            runs_started: 0,
            viewport: Viewport::default(),
            sentinel_radius: None,
            dragging: None,
        }
    }

    pub fn status(&self) -> LayoutStatus {
        self.status
    }

    #[cfg(test)]
    pub fn runs_started(&self) -> u64 {
        self.runs_started
    }

    #[cfg(test)]
    pub fn active_handle(&self) -> Option<TickHandle> {
        self.active
    }

    pub fn containment(&self) -> ContainmentMode {
        self.containment
    }

    /// Takes effect on the next [`Self::relayout`].
    pub fn set_containment(&mut self, containment: ContainmentMode) {
        self.containment = containment;
    }

    #[cfg(test)]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn bubbles(&self) -> &[Bubble] {
        self.simulation
            .as_ref()
            .map(Simulation::bubbles)
            .unwrap_or_default()
    }

    pub fn alpha(&self) -> Option<f32> {
        self.simulation.as_ref().map(Simulation::alpha)
    }

    pub fn is_animating(&self) -> bool {
        self.status == LayoutStatus::Running
    }

    /// Topmost bubble under `point`.
    pub fn bubble_at(&self, point: Pos2) -> Option<usize> {
        self.bubbles()
            .iter()
            .enumerate()
            .rev()
            .find(|(_, bubble)| bubble.node.contains(point))
            .map(|(index, _)| index)
    }

    fn cancel_active(&mut self) {
        if let Some(handle) = self.active.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Stops whatever run is in flight and starts a new one for `input`.
    pub fn relayout(&mut self, input: LayoutInput<'_>) {
        if self.status == LayoutStatus::Disposed {
            debug!("ignoring relayout on a disposed layout");
            return;
        }

        self.cancel_active();
        self.dragging = None;

        if input.loading {
            self.status = LayoutStatus::Idle;
            return;
        }

        let mut items = input
            .items
            .iter()
            .filter(|item| !item.is_sentinel && input.selected.contains(&item.id))
            .cloned()
            .collect::<Vec<_>>();

        if items.is_empty() {
            self.simulation = None;
            self.sentinel_radius = None;
            self.status = LayoutStatus::Idle;
            return;
        }

        if !input.viewport.is_valid() {
            debug!(
                width = input.viewport.width,
                height = input.viewport.height,
                "deferring layout until the viewport has a size"
            );
            self.status = LayoutStatus::Idle;
            return;
        }

        self.status = LayoutStatus::Initializing;
        input.sort.apply(&mut items);

        let values = items.iter().map(PricedItem::value).collect::<Vec<_>>();
        let sizing = solve_sizes(&values, input.viewport, self.target_coverage);
        let sentinel_radius = self.update_sentinel_radius(sizing.largest().unwrap_or(0.0));

        let prior = self
            .simulation
            .take()
            .map(Simulation::into_bubbles)
            .unwrap_or_default()
            .into_iter()
            .map(|bubble| (bubble.item.id, bubble.node))
            .collect::<HashMap<_, _>>();
        let scale = if self.viewport.is_valid() {
            vec2(
                input.viewport.width / self.viewport.width,
                input.viewport.height / self.viewport.height,
            )
        } else {
            vec2(1.0, 1.0)
        };

        let center = input.viewport.center();
        let mut warm = 0usize;
        let mut place = |index: usize, item: PricedItem, radius: f32| {
            let node = match prior.get(&item.id) {
                Some(previous) => {
                    if !item.is_sentinel {
                        warm += 1;
                    }
                    LayoutNode {
                        radius,
                        position: Pos2::new(
                            previous.position.x * scale.x,
                            previous.position.y * scale.y,
                        ),
                        velocity: previous.velocity * scale,
                        pinned: None,
                    }
                }
                None => LayoutNode::at(seed_position(center, index, &item), radius),
            };
            Bubble { item, node }
        };

        let mut bubbles = items
            .into_iter()
            .zip(sizing.radii.iter().copied())
            .enumerate()
            .map(|(index, (item, radius))| place(index, item, radius))
            .collect::<Vec<_>>();
        if let Some(radius) = sentinel_radius {
            bubbles.push(place(bubbles.len(), sentinel_item(), radius));
        }

        let alpha = if warm > 0 {
            self.tuning.warm_alpha
        } else {
            COLD_ALPHA
        };
        let node_count = bubbles.len();
        self.simulation = Some(Simulation::for_containment(
            bubbles,
            &self.tuning,
            input.viewport,
            self.containment,
            alpha,
        ));

        self.runs_started += 1;
        let run = RunId(self.runs_started);
        self.run = Some(run);
        self.active = Some(self.scheduler.subscribe(run));
        self.viewport = input.viewport;
        self.status = LayoutStatus::Running;

        info!(
            run = run.0,
            nodes = node_count,
            warm,
            alpha,
            containment = %self.containment,
            coverage = sizing.covered_area / sizing.target_area.max(f64::EPSILON),
            "started bubble layout"
        );
    }

    /// Keeps the previous sentinel radius unless the new one drifted past the tolerance.
    fn update_sentinel_radius(&mut self, largest: f32) -> Option<f32> {
        let radius = largest * SENTINEL_SCALE;
        if radius <= 0.0 {
            return self.sentinel_radius;
        }

        match self.sentinel_radius {
            Some(previous) if (previous - radius).abs() <= SENTINEL_DRIFT_TOLERANCE => {}
            _ => self.sentinel_radius = Some(radius),
        }
        self.sentinel_radius
    }

    /// Applies one tick. Returns `false` when the handle belongs to a superseded run.
    pub fn on_tick(&mut self, handle: TickHandle) -> bool {
        if self.active != Some(handle) {
            warn!(
                run = handle.run.0,
                slot = handle.slot,
                "ignoring tick from a superseded layout run"
            );
            return false;
        }

        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };

        let hot = simulation.tick();
        if !hot && self.dragging.is_none() {
            let ticks = simulation.ticks();
            self.cancel_active();
            self.status = LayoutStatus::Settled;
            debug!(run = handle.run.0, ticks, "bubble layout settled");
        }
        true
    }

    /// Delivers every tick the scheduler has due. Returns whether the layout is still moving.
    pub fn advance_frame(&mut self) -> bool {
        for handle in self.scheduler.due() {
            self.on_tick(handle);
        }
        self.is_animating()
    }

    /// Pins `index` where it is and reheats the run, resuming it if settled.
    pub fn begin_drag(&mut self, index: usize) -> bool {
        if self.status == LayoutStatus::Disposed {
            return false;
        }
        let Some(simulation) = self.simulation.as_mut() else {
            return false;
        };
        let Some(position) = simulation.bubbles().get(index).map(|bubble| bubble.node.position)
        else {
            return false;
        };

        simulation.pin(index, position);
        simulation.set_alpha_target(self.tuning.drag_alpha_target);
        self.dragging = Some(index);

        if self.active.is_none()
            && let Some(run) = self.run
        {
            self.active = Some(self.scheduler.subscribe(run));
            self.status = LayoutStatus::Running;
            debug!(run = run.0, "resumed bubble layout for drag");
        }
        true
    }

    pub fn drag_to(&mut self, position: Pos2) {
        if let (Some(index), Some(simulation)) = (self.dragging, self.simulation.as_mut()) {
            simulation.pin(index, position);
        }
    }

    pub fn end_drag(&mut self) {
        if let (Some(index), Some(simulation)) = (self.dragging.take(), self.simulation.as_mut()) {
            simulation.release(index);
            simulation.set_alpha_target(0.0);
        }
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Stops the run for good. Later calls are no-ops.
    pub fn dispose(&mut self) {
        if self.status == LayoutStatus::Disposed {
            return;
        }
        self.cancel_active();
        self.dragging = None;
        self.simulation = None;
        self.status = LayoutStatus::Disposed;
        debug!(runs = self.runs_started, "disposed bubble layout");
    }
}

/// Sunflower spiral around `center`, nudged by a per-id offset so equal inputs land identically.
fn seed_position(center: Pos2, index: usize, item: &PricedItem) -> Pos2 {
    if item.is_sentinel {
        return center;
    }
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let angle = index as f32 * golden_angle;
    let distance = SEED_RADIUS * (0.5 + index as f32).sqrt();
    let (jitter_x, jitter_y) = stable_pair(&item.id);
    center
        + vec2(angle.cos(), angle.sin()) * distance
        + vec2(jitter_x, jitter_y) * SEED_JITTER
}

#[cfg(test)]
mod tests {
    use eframe::egui::Vec2;

    use super::*;
    use crate::bubbles::SENTINEL_ID;
    use crate::bubbles::test_support::item;

    #[derive(Default)]
    struct ManualTicker {
        next_slot: u64,
        live: Vec<TickHandle>,
        subscribed: Vec<TickHandle>,
        cancelled: Vec<TickHandle>,
    }

    impl TickScheduler for ManualTicker {
        fn subscribe(&mut self, run: RunId) -> TickHandle {
            self.next_slot += 1;
            let handle = TickHandle {
                run,
                slot: self.next_slot,
            };
            self.live.push(handle);
            self.subscribed.push(handle);
            handle
        }

        fn cancel(&mut self, handle: TickHandle) {
            self.live.retain(|live| *live != handle);
            self.cancelled.push(handle);
        }

        fn due(&mut self) -> Vec<TickHandle> {
            self.live.clone()
        }
    }

    fn controller(mode: ContainmentMode) -> LayoutController<ManualTicker> {
        LayoutController::new(ManualTicker::default(), SimulationTuning::default(), mode, 0.3)
    }

    fn catalog() -> Vec<PricedItem> {
        [
            ("Plush Pepe", 301.0, Some(12.5)),
            ("Top Hat", 113.0, Some(-2.3)),
            ("Swag Bag", 71.0, None),
            ("Lol Pop", 38.0, Some(5.7)),
            ("Berry Box", 169.0, Some(-8.1)),
            ("Ion Gem", 15.0, Some(0.0)),
            ("Hex Pot", 0.0, None),
            ("Spy Agaric", 52.0, Some(1.2)),
        ]
        .into_iter()
        .map(|(id, value, change)| item(id, value, change))
        .collect()
    }

    fn all_ids(items: &[PricedItem]) -> HashSet<String> {
        items.iter().map(|item| item.id.clone()).collect()
    }

    fn input<'a>(
        items: &'a [PricedItem],
        selected: &'a HashSet<String>,
        viewport: Viewport,
    ) -> LayoutInput<'a> {
        LayoutInput {
            items,
            loading: false,
            selected,
            sort: SortMethod::Default,
            viewport,
        }
    }

    fn settle(controller: &mut LayoutController<ManualTicker>) {
        for _ in 0..2_000 {
            if !controller.advance_frame() {
                break;
            }
        }
        assert_eq!(controller.status(), LayoutStatus::Settled);
    }

    fn viewport() -> Viewport {
        Viewport::new(800.0, 600.0)
    }

    #[test]
    fn sentinel_joins_every_layout() {
        let items = vec![item("A", 100.0, Some(1.0)), item("B", 50.0, Some(-1.0))];
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(input(&items, &selected, viewport()));

        let bubbles = layout.bubbles();
        assert_eq!(bubbles.len(), 3);
        let sentinel = bubbles.last().expect("sentinel");
        assert_eq!(sentinel.item.id, SENTINEL_ID);
        assert!(sentinel.is_sentinel());

        let largest = bubbles[..2]
            .iter()
            .map(|bubble| bubble.node.radius)
            .fold(0.0_f32, f32::max);
        let ratio = sentinel.node.radius / largest;
        assert!((0.6..=0.8 + 1e-4).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn settled_layout_has_no_overlaps() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(input(&items, &selected, viewport()));
        settle(&mut layout);

        let bubbles = layout.bubbles();
        for (index, first) in bubbles.iter().enumerate() {
            assert!(first.node.radius > 0.0);
            for second in &bubbles[index + 1..] {
                let distance = first.node.position.distance(second.node.position);
                assert!(
                    distance >= first.node.radius + second.node.radius - 0.5,
                    "{} overlaps {}",
                    first.item.id,
                    second.item.id
                );
            }
        }
        assert!(layout.scheduler().live.is_empty());
    }

    fn assert_inside(layout: &LayoutController<ManualTicker>, area: Viewport, slack: f32) {
        for bubble in layout.bubbles() {
            let node = bubble.node;
            let id = &bubble.item.id;
            assert!(node.position.x - node.radius >= -slack, "{id} left");
            assert!(node.position.y - node.radius >= -slack, "{id} top");
            assert!(node.position.x + node.radius <= area.width + slack, "{id} right");
            assert!(node.position.y + node.radius <= area.height + slack, "{id} bottom");
        }
    }

    fn many_items(count: usize) -> Vec<PricedItem> {
        (0..count)
            .map(|index| {
                let value = 5.0 + (index % 7) as f64 * 40.0 + index as f64;
                item(&format!("gift {index}"), value, Some(index as f64 - 10.0))
            })
            .collect()
    }

    #[test]
    fn boundary_mode_keeps_bubbles_inside() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::BoundaryRepel);
        let area = viewport();
        layout.relayout(input(&items, &selected, area));
        settle(&mut layout);
        assert_inside(&layout, area, 1.0);
    }

    #[test]
    fn center_pull_keeps_bubbles_inside() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        let area = viewport();
        layout.relayout(input(&items, &selected, area));
        settle(&mut layout);
        assert_inside(&layout, area, 1.0);
    }

    #[test]
    fn center_pull_contains_a_crowded_wide_strip() {
        let items = many_items(30);
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        let area = Viewport::new(1600.0, 300.0);
        layout.relayout(input(&items, &selected, area));
        settle(&mut layout);
        assert_inside(&layout, area, 1.5);
    }

    #[test]
    fn identical_inputs_give_identical_layout_shape() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);

        layout.relayout(input(&items, &selected, viewport()));
        let shape = |layout: &LayoutController<ManualTicker>| {
            layout
                .bubbles()
                .iter()
                .map(|bubble| (bubble.item.id.clone(), bubble.node.radius))
                .collect::<Vec<_>>()
        };
        let first = shape(&layout);
        layout.relayout(input(&items, &selected, viewport()));
        assert_eq!(first, shape(&layout));
        assert_eq!(layout.runs_started(), 2);
    }

    #[test]
    fn stale_ticks_never_touch_the_new_run() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);

        layout.relayout(input(&items, &selected, viewport()));
        let stale = layout.active_handle().expect("first run subscribed");

        let fewer = items[..4].to_vec();
        layout.relayout(input(&fewer, &selected, viewport()));
        let current = layout.active_handle().expect("second run subscribed");
        assert_ne!(stale, current);
        assert!(layout.scheduler().cancelled.contains(&stale));

        let before = layout
            .bubbles()
            .iter()
            .map(|bubble| bubble.node)
            .collect::<Vec<_>>();
        assert!(!layout.on_tick(stale));
        let after = layout
            .bubbles()
            .iter()
            .map(|bubble| bubble.node)
            .collect::<Vec<_>>();
        assert_eq!(before, after);

        assert!(layout.on_tick(current));
    }

    #[test]
    fn zero_viewport_defers_until_resized() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);

        layout.relayout(input(&items, &selected, Viewport::new(0.0, 0.0)));
        assert_eq!(layout.runs_started(), 0);
        assert_eq!(layout.status(), LayoutStatus::Idle);
        assert!(layout.scheduler().subscribed.is_empty());

        layout.relayout(input(&items, &selected, viewport()));
        assert_eq!(layout.runs_started(), 1);
        assert_eq!(layout.scheduler().subscribed.len(), 1);
        assert_eq!(layout.status(), LayoutStatus::Running);
    }

    #[test]
    fn warm_update_keeps_surviving_positions() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(input(&items, &selected, viewport()));
        settle(&mut layout);

        let position_of = |layout: &LayoutController<ManualTicker>, id: &str| {
            layout
                .bubbles()
                .iter()
                .find(|bubble| bubble.item.id == id)
                .map(|bubble| bubble.node.position)
        };
        let before = position_of(&layout, "Top Hat").expect("top hat placed");

        let mut refreshed = items.clone();
        refreshed.push(item("Snow Globe", 44.0, Some(2.0)));
        let selected = all_ids(&refreshed);
        layout.relayout(input(&refreshed, &selected, viewport()));

        assert_eq!(position_of(&layout, "Top Hat"), Some(before));
        assert_eq!(layout.alpha(), Some(SimulationTuning::default().warm_alpha));

        let wider = Viewport::new(1600.0, 600.0);
        layout.relayout(input(&refreshed, &selected, wider));
        let moved = position_of(&layout, "Top Hat").expect("top hat kept");
        assert!((moved.x - before.x * 2.0).abs() < 1e-3);
        assert!((moved.y - before.y).abs() < 1e-3);
    }

    #[test]
    fn selection_filters_and_empty_selection_idles() {
        let items = catalog();
        let selected = ["Top Hat", "Lol Pop"]
            .into_iter()
            .map(str::to_owned)
            .collect::<HashSet<_>>();
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(input(&items, &selected, viewport()));

        let ids = layout
            .bubbles()
            .iter()
            .map(|bubble| bubble.item.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["Top Hat", "Lol Pop", SENTINEL_ID]);

        layout.relayout(input(&items, &HashSet::new(), viewport()));
        assert_eq!(layout.status(), LayoutStatus::Idle);
        assert!(layout.bubbles().is_empty());
        assert!(layout.active_handle().is_none());
    }

    #[test]
    fn sort_changes_node_order_only() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(LayoutInput {
            sort: SortMethod::ByValue,
            ..input(&items, &selected, viewport())
        });

        let bubbles = layout.bubbles();
        assert_eq!(bubbles[0].item.id, "Plush Pepe");
        assert_eq!(bubbles[bubbles.len() - 2].item.id, "Hex Pot");
    }

    #[test]
    fn loading_stops_the_run_without_starting_another() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(input(&items, &selected, viewport()));

        layout.relayout(LayoutInput {
            loading: true,
            ..input(&items, &selected, viewport())
        });
        assert_eq!(layout.status(), LayoutStatus::Idle);
        assert_eq!(layout.runs_started(), 1);
        assert!(layout.scheduler().live.is_empty());
    }

    #[test]
    fn drag_resumes_a_settled_run() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(input(&items, &selected, viewport()));
        settle(&mut layout);

        assert!(layout.begin_drag(0));
        assert_eq!(layout.status(), LayoutStatus::Running);
        let target = Pos2::new(120.0, 140.0);
        layout.drag_to(target);
        for _ in 0..30 {
            layout.advance_frame();
        }
        assert_eq!(layout.bubbles()[0].node.position, target);
        assert_eq!(layout.status(), LayoutStatus::Running);

        layout.end_drag();
        assert_eq!(layout.bubbles()[0].node.pinned, None);
        settle(&mut layout);
    }

    #[test]
    fn dispose_is_terminal() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(input(&items, &selected, viewport()));
        let handle = layout.active_handle().expect("subscribed");

        layout.dispose();
        assert_eq!(layout.status(), LayoutStatus::Disposed);
        assert!(layout.scheduler().cancelled.contains(&handle));
        assert!(!layout.on_tick(handle));

        layout.relayout(input(&items, &selected, viewport()));
        assert_eq!(layout.status(), LayoutStatus::Disposed);
        assert_eq!(layout.runs_started(), 1);
        assert!(!layout.begin_drag(0));
    }

    #[test]
    fn hit_testing_prefers_topmost_bubble() {
        let items = vec![item("A", 100.0, None)];
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(input(&items, &selected, viewport()));

        let sentinel_center = layout.bubbles()[1].node.position;
        assert_eq!(layout.bubble_at(sentinel_center), Some(1));
        assert_eq!(layout.bubble_at(Pos2::new(-500.0, -500.0)), None);
    }

    fn sentinel_radius(layout: &LayoutController<ManualTicker>) -> f32 {
        layout
            .bubbles()
            .iter()
            .find(|bubble| bubble.is_sentinel())
            .map(|bubble| bubble.node.radius)
            .expect("sentinel placed")
    }

    #[test]
    fn sentinel_radius_ignores_small_drift() {
        // A single item always clamps to the maximum radius, 0.15 of the short side.
        let items = vec![item("A", 100.0, Some(1.0))];
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);

        layout.relayout(input(&items, &selected, Viewport::new(800.0, 600.0)));
        let first = sentinel_radius(&layout);
        let largest = layout.bubbles()[0].node.radius;
        assert!((first - largest * 0.8).abs() < 1e-4);

        layout.relayout(input(&items, &selected, Viewport::new(800.0, 600.5)));
        let nudged = layout.bubbles()[0].node.radius;
        assert!(nudged > largest);
        assert!((nudged - largest) * 0.8 < 0.1);
        assert_eq!(sentinel_radius(&layout), first);

        layout.relayout(input(&items, &selected, Viewport::new(800.0, 602.0)));
        let grown = layout.bubbles()[0].node.radius;
        assert!((grown - largest) * 0.8 > 0.1);
        let updated = sentinel_radius(&layout);
        assert_ne!(updated, first);
        assert!((updated - grown * 0.8).abs() < 1e-4);
    }

    #[test]
    fn disjoint_selection_starts_cold() {
        let items = catalog();
        let first = ["Top Hat", "Lol Pop"]
            .into_iter()
            .map(str::to_owned)
            .collect::<HashSet<_>>();
        let second = ["Swag Bag", "Ion Gem"]
            .into_iter()
            .map(str::to_owned)
            .collect::<HashSet<_>>();
        let mut layout = controller(ContainmentMode::CenterPull);

        layout.relayout(input(&items, &first, viewport()));
        settle(&mut layout);
        layout.relayout(input(&items, &second, viewport()));
        assert_eq!(layout.alpha(), Some(COLD_ALPHA));

        layout.relayout(input(&items, &second, viewport()));
        assert_eq!(layout.alpha(), Some(SimulationTuning::default().warm_alpha));
    }

    #[test]
    fn resize_rescales_velocity_with_position() {
        let items = catalog();
        let selected = all_ids(&items);
        let mut layout = controller(ContainmentMode::CenterPull);
        layout.relayout(input(&items, &selected, viewport()));
        for _ in 0..5 {
            layout.advance_frame();
        }

        let node_of = |layout: &LayoutController<ManualTicker>| {
            layout
                .bubbles()
                .iter()
                .find(|bubble| bubble.item.id == "Top Hat")
                .map(|bubble| bubble.node)
                .expect("top hat placed")
        };
        let before = node_of(&layout);
        assert_ne!(before.velocity, Vec2::ZERO);

        layout.relayout(input(&items, &selected, Viewport::new(1600.0, 300.0)));
        let after = node_of(&layout);
        assert!((after.velocity.x - before.velocity.x * 2.0).abs() < 1e-4);
        assert!((after.velocity.y - before.velocity.y * 0.5).abs() < 1e-4);
        assert!((after.position.x - before.position.x * 2.0).abs() < 1e-3);
        assert!((after.position.y - before.position.y * 0.5).abs() < 1e-3);
    }
}
