use eframe::egui::Pos2;

const HOVER_DELAY: f64 = 0.3;
const FADE_DURATION: f64 = 0.15;
const PULSE_RISE: f64 = 0.2;
const PULSE_FALL: f64 = 0.2;
const PULSE_GROWTH: f32 = 0.1;

#[derive(Clone, Debug, PartialEq)]
enum TooltipPhase {
    Hidden,
    Pending { id: String, since: f64 },
    Visible { id: String },
    Fading { id: String, since: f64 },
}

/// What the tooltip should draw this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipFrame<'a> {
    pub id: &'a str,
    pub pointer: Pos2,
    pub opacity: f32,
}

/// Debounced hover tooltip that follows the pointer and fades out on leave.
#[derive(Debug)]
pub struct HoverTooltip {
    phase: TooltipPhase,
    pointer: Pos2,
}

impl Default for HoverTooltip {
    fn default() -> Self {
        Self {
            phase: TooltipPhase::Hidden,
            pointer: Pos2::ZERO,
        }
    }
}

impl HoverTooltip {
    /// Feeds the hovered bubble id for this frame; callers pass `None` for the sentinel.
    pub fn update(&mut self, hovered: Option<&str>, pointer: Option<Pos2>, now: f64) {
        if let Some(pointer) = pointer {
            self.pointer = pointer;
        }

        let phase = std::mem::replace(&mut self.phase, TooltipPhase::Hidden);
        self.phase = match (phase, hovered) {
            (TooltipPhase::Pending { id, since }, Some(hovered)) if id == hovered => {
                if now - since >= HOVER_DELAY {
                    TooltipPhase::Visible { id }
                } else {
                    TooltipPhase::Pending { id, since }
                }
            }
            (TooltipPhase::Visible { id }, Some(hovered)) if id == hovered => {
                TooltipPhase::Visible { id }
            }
            (_, Some(hovered)) => TooltipPhase::Pending {
                id: hovered.to_owned(),
                since: now,
            },
            (TooltipPhase::Visible { id }, None) => TooltipPhase::Fading { id, since: now },
            (TooltipPhase::Fading { id, since }, None) if now - since < FADE_DURATION => {
                TooltipPhase::Fading { id, since }
            }
            (_, None) => TooltipPhase::Hidden,
        };
    }

    pub fn frame(&self, now: f64) -> Option<TooltipFrame<'_>> {
        match &self.phase {
            TooltipPhase::Visible { id } => Some(TooltipFrame {
                id,
                pointer: self.pointer,
                opacity: 1.0,
            }),
            TooltipPhase::Fading { id, since } => {
                let remaining = 1.0 - ((now - since) / FADE_DURATION).clamp(0.0, 1.0);
                (remaining > 0.0).then_some(TooltipFrame {
                    id,
                    pointer: self.pointer,
                    opacity: remaining as f32,
                })
            }
            TooltipPhase::Hidden | TooltipPhase::Pending { .. } => None,
        }
    }

    /// Time at which the tooltip changes next without new input.
    pub fn next_wakeup(&self) -> Option<f64> {
        match &self.phase {
            TooltipPhase::Pending { since, .. } => Some(since + HOVER_DELAY),
            TooltipPhase::Fading { since, .. } => Some(since + FADE_DURATION),
            TooltipPhase::Hidden | TooltipPhase::Visible { .. } => None,
        }
    }

    pub fn clear(&mut self) {
        self.phase = TooltipPhase::Hidden;
    }
}

/// Radius pulse played on the clicked bubble.
#[derive(Debug, Default)]
pub struct ClickPulse {
    active: Option<(String, f64)>,
}

impl ClickPulse {
    pub fn trigger(&mut self, id: &str, now: f64) {
        self.active = Some((id.to_owned(), now));
    }

    /// Radius multiplier for `id`: ramps to 1.1 and back to 1.0.
    pub fn scale(&self, id: &str, now: f64) -> f32 {
        let Some((active, started)) = &self.active else {
            return 1.0;
        };
        if active != id {
            return 1.0;
        }

        let elapsed = now - started;
        let progress = if elapsed < 0.0 {
            0.0
        } else if elapsed < PULSE_RISE {
            elapsed / PULSE_RISE
        } else if elapsed < PULSE_RISE + PULSE_FALL {
            1.0 - (elapsed - PULSE_RISE) / PULSE_FALL
        } else {
            0.0
        };
        1.0 + PULSE_GROWTH * progress as f32
    }

    pub fn is_running(&self, now: f64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|(_, started)| now - started < PULSE_RISE + PULSE_FALL)
    }
}
