//! Touch activity tracking
//!
//! Records the most recent moment two or more simultaneous touches were
//! observed on the passive gesture tap, plus the peak concurrent touch
//! count since the last scroll event consumed it. Single writer, single
//! reader: both are the tap callback, which the run loop invokes serially,
//! so no synchronization is needed.

/// Minimum concurrent touches that count as trackpad activity.
/// One finger resting on the pad is not scroll intent.
pub const MIN_GESTURE_TOUCHES: u32 = 2;

/// Tracks recent multi-finger touch activity.
#[derive(Debug, Default)]
pub struct TouchActivityTracker {
    last_touch_nanos: u64,
    max_touches: u32,
}

impl TouchActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a gesture notification.
    ///
    /// Touch counts below [`MIN_GESTURE_TOUCHES`] are ignored entirely: the
    /// count is raised, never lowered, mid-gesture, and the timestamp only
    /// moves forward on qualifying gestures.
    pub fn on_gesture(&mut self, touch_count: u32, now: u64) {
        if touch_count >= MIN_GESTURE_TOUCHES {
            self.last_touch_nanos = now;
            self.max_touches = self.max_touches.max(touch_count);
        }
    }

    /// Read and reset: returns `(last_touch_nanos, max_touches)` and resets
    /// the touch count to zero.
    ///
    /// The timestamp is retained so elapsed-time computations stay valid
    /// across consecutive mouse-only periods; only the count is
    /// consume-once (each scroll event sees only the gesture activity since
    /// the previous scroll event).
    pub fn consume(&mut self) -> (u64, u32) {
        let state = (self.last_touch_nanos, self.max_touches);
        self.max_touches = 0;
        state
    }
}
