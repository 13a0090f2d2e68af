mod controller;
mod forces;
mod interaction;
mod quadtree;
mod scheduler;
mod simulation;
mod sizing;
mod viewport;

use std::fmt;
use std::str::FromStr;

use eframe::egui::{Pos2, Vec2, pos2};
use serde::Deserialize;

use crate::gifts::PricedItem;

pub use controller::{LayoutController, LayoutInput, LayoutStatus};
pub use interaction::{ClickPulse, HoverTooltip, TooltipFrame};
pub use scheduler::{FrameTicker, RunId, TickHandle, TickScheduler};
pub use simulation::SimulationTuning;
pub use sizing::{RadiusBounds, SizingOutcome, solve_sizes};
pub use viewport::ViewportController;

pub const SENTINEL_ID: &str = "gift_graphs_bot";
pub const SENTINEL_NAME: &str = "Gift Graphs Bot";
pub const SENTINEL_LABEL: &str = "@Gift_Graphs_bot";

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Layout never runs against a degenerate viewport.
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 1.0 && self.height >= 1.0
    }

    pub fn min_side(self) -> f32 {
        self.width.min(self.height)
    }

    pub fn area(self) -> f64 {
        f64::from(self.width) * f64::from(self.height)
    }

    pub fn center(self) -> Pos2 {
        pos2(self.width * 0.5, self.height * 0.5)
    }
}

/// Runtime state of one bubble inside a simulation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutNode {
    pub radius: f32,
    pub position: Pos2,
    pub velocity: Vec2,
    /// Present only while the bubble is dragged.
    pub pinned: Option<Pos2>,
}

impl LayoutNode {
    pub fn at(position: Pos2, radius: f32) -> Self {
        Self {
            radius,
            position,
            velocity: Vec2::ZERO,
            pinned: None,
        }
    }

    pub fn contains(&self, point: Pos2) -> bool {
        self.position.distance_sq(point) <= self.radius * self.radius
    }
}

#[derive(Clone, Debug)]
pub struct Bubble {
    pub item: PricedItem,
    pub node: LayoutNode,
}

impl Bubble {
    pub fn is_sentinel(&self) -> bool {
        self.item.is_sentinel
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMethod {
    #[default]
    Default,
    ByValue,
    ByChange,
}

impl SortMethod {
    pub const ALL: [Self; 3] = [Self::Default, Self::ByValue, Self::ByChange];

    pub fn label(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::ByValue => "By value",
            Self::ByChange => "By change",
        }
    }

    /// Stable sort; ties keep input order.
    pub fn apply(self, items: &mut [PricedItem]) {
        match self {
            Self::Default => {}
            Self::ByValue => items.sort_by(|a, b| b.value().total_cmp(&a.value())),
            Self::ByChange => items.sort_by(|a, b| b.change().total_cmp(&a.change())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainmentMode {
    #[default]
    CenterPull,
    BoundaryRepel,
}

impl ContainmentMode {
    pub const ALL: [Self; 2] = [Self::CenterPull, Self::BoundaryRepel];

    pub fn label(self) -> &'static str {
        match self {
            Self::CenterPull => "Center pull",
            Self::BoundaryRepel => "Boundary repel",
        }
    }
}

impl fmt::Display for ContainmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CenterPull => f.write_str("center-pull"),
            Self::BoundaryRepel => f.write_str("boundary-repel"),
        }
    }
}

impl FromStr for ContainmentMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "center-pull" | "center" => Ok(Self::CenterPull),
            "boundary-repel" | "boundary" => Ok(Self::BoundaryRepel),
            other => Err(format!(
                "unknown containment mode `{other}`, expected center-pull or boundary-repel"
            )),
        }
    }
}

/// The decorative bubble present in every non-empty layout.
pub fn sentinel_item() -> PricedItem {
    PricedItem {
        id: SENTINEL_ID.to_owned(),
        display_name: SENTINEL_NAME.to_owned(),
        symbol_label: SENTINEL_LABEL.to_owned(),
        model_name: "Bot".to_owned(),
        variant_name: None,
        image_ref: None,
        value_metric: Some(0.0),
        change_ratio: Some(0.0),
        price_usd: 0.0,
        price_ton: 0.0,
        status: crate::gifts::ItemStatus::Live,
        is_sentinel: true,
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::item;
    use super::*;

    #[test]
    fn sorting_orders_nodes_only() {
        let mut items = vec![
            item("a", 10.0, Some(-1.0)),
            item("b", 30.0, None),
            item("c", 20.0, Some(4.0)),
        ];

        SortMethod::ByValue.apply(&mut items);
        let ids = items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "c", "a"]);

        SortMethod::ByChange.apply(&mut items);
        let ids = items.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn containment_mode_parses_cli_spelling() {
        assert_eq!(
            "boundary-repel".parse::<ContainmentMode>(),
            Ok(ContainmentMode::BoundaryRepel)
        );
        assert_eq!(
            "Center-Pull".parse::<ContainmentMode>(),
            Ok(ContainmentMode::CenterPull)
        );
        assert!("sideways".parse::<ContainmentMode>().is_err());
        assert_eq!(ContainmentMode::BoundaryRepel.to_string(), "boundary-repel");
    }

    #[test]
    fn zero_viewport_is_invalid() {
        assert!(!Viewport::new(0.0, 0.0).is_valid());
        assert!(!Viewport::new(800.0, 0.0).is_valid());
        assert!(Viewport::new(800.0, 600.0).is_valid());
    }
}
