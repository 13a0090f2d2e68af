/// Identifies one simulation run of a [`super::LayoutController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

/// A live tick subscription. Delivered back to the controller on every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle {
    pub run: RunId,
    pub slot: u64,
}

/// Source of simulation ticks.
///
/// The app drives ticks from the frame loop; tests drive them by hand.
pub trait TickScheduler {
    fn subscribe(&mut self, run: RunId) -> TickHandle;
    fn cancel(&mut self, handle: TickHandle);
    /// Handles that should tick now.
    fn due(&mut self) -> Vec<TickHandle>;
}

/// One tick per rendered frame for every live subscription.
#[derive(Debug, Default)]
pub struct FrameTicker {
    next_slot: u64,
    active: Vec<TickHandle>,
}

impl FrameTicker {
    #[cfg(test)]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

impl TickScheduler for FrameTicker {
    fn subscribe(&mut self, run: RunId) -> TickHandle {
        self.next_slot += 1;
        let handle = TickHandle {
            run,
            slot: self.next_slot,
        };
        self.active.push(handle);
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.active.retain(|active| *active != handle);
    }

    fn due(&mut self) -> Vec<TickHandle> {
        self.active.clone()
    }
}
