use tracing::debug;

use super::Viewport;

/// Seconds to wait before re-measuring a zero-sized canvas.
const RETRY_DELAY: f64 = 0.1;

/// Turns per-frame canvas measurements into resize events.
#[derive(Debug, Default)]
pub struct ViewportController {
    current: Option<Viewport>,
    retry_at: Option<f64>,
    disposed: bool,
}

impl ViewportController {
    pub fn current(&self) -> Option<Viewport> {
        self.current
    }

    /// Returns the new viewport when a valid size differs from the last one.
    ///
    /// A degenerate measurement is not acted on; the next one is only accepted
    /// after the retry delay has passed.
    pub fn observe(&mut self, measured: Viewport, now: f64) -> Option<Viewport> {
        if self.disposed {
            return None;
        }

        if let Some(retry_at) = self.retry_at {
            if now < retry_at {
                return None;
            }
            self.retry_at = None;
        }

        if !measured.is_valid() {
            self.retry_at = Some(now + RETRY_DELAY);
            debug!(
                width = measured.width,
                height = measured.height,
                "canvas has no size yet, retrying"
            );
            return None;
        }

        if self.current == Some(measured) {
            return None;
        }

        self.current = Some(measured);
        Some(measured)
    }

    /// When the pending retry fires, if any.
    pub fn next_wakeup(&self) -> Option<f64> {
        self.retry_at
    }

    pub fn dispose(&mut self) {
        self.retry_at = None;
        self.disposed = true;
    }
}
