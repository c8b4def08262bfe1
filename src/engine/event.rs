//! Event accessor abstraction
//!
//! The engine mutates events it does not own: the tap callback hands it a
//! borrowed view over a live CGEvent, and the mutation must happen in place
//! (no copies, no allocation) because the callback sits on the synchronous
//! path of every input event. [`PointerEvent`] is the minimal accessor
//! surface the engine needs, so the classification and transform logic can
//! be exercised against [`SyntheticEvent`] without a real OS event.

/// Accessor contract over an externally owned pointer event.
///
/// Getters read the fields the engine classifies on; setters mutate the
/// event in place. Fields that do not apply to a given event type (touch
/// count on a scroll event, deltas on a click) read as zero.
pub trait PointerEvent {
    /// Event timestamp in monotonic nanoseconds.
    fn timestamp_nanos(&self) -> u64;

    /// Whether the event stream reports sub-pixel/continuous deltas
    /// (trackpads, inertial mice) rather than discrete notches.
    fn is_continuous(&self) -> bool;

    fn vertical_delta(&self) -> i64;
    fn horizontal_delta(&self) -> i64;
    fn set_vertical_delta(&mut self, delta: i64);
    fn set_horizontal_delta(&mut self, delta: i64);

    fn shift_flag(&self) -> bool;
    fn clear_shift_flag(&mut self);

    fn control_flag(&self) -> bool;
    fn clear_control_flag(&mut self);

    /// Number of concurrent touches, for gesture events.
    fn touch_count(&self) -> u32;
}

/// Plain in-memory event record implementing [`PointerEvent`].
///
/// Used by unit and integration tests, and by the benchmarks, in place of a
/// live CGEvent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntheticEvent {
    pub timestamp_nanos: u64,
    pub continuous: bool,
    pub vertical: i64,
    pub horizontal: i64,
    pub shift: bool,
    pub control: bool,
    pub touches: u32,
}

impl SyntheticEvent {
    /// A scroll event with the given continuity flag and deltas.
    pub fn scroll(timestamp_nanos: u64, continuous: bool, vertical: i64, horizontal: i64) -> Self {
        Self {
            timestamp_nanos,
            continuous,
            vertical,
            horizontal,
            ..Self::default()
        }
    }

    /// A gesture event carrying a concurrent touch count.
    pub fn gesture(timestamp_nanos: u64, touches: u32) -> Self {
        Self {
            timestamp_nanos,
            touches,
            ..Self::default()
        }
    }

    /// A primary-button-down event, optionally with the control flag set.
    pub fn click(timestamp_nanos: u64, control: bool) -> Self {
        Self {
            timestamp_nanos,
            control,
            ..Self::default()
        }
    }
}

impl PointerEvent for SyntheticEvent {
    fn timestamp_nanos(&self) -> u64 {
        self.timestamp_nanos
    }

    fn is_continuous(&self) -> bool {
        self.continuous
    }

    fn vertical_delta(&self) -> i64 {
        self.vertical
    }

    fn horizontal_delta(&self) -> i64 {
        self.horizontal
    }

    fn set_vertical_delta(&mut self, delta: i64) {
        self.vertical = delta;
    }

    fn set_horizontal_delta(&mut self, delta: i64) {
        self.horizontal = delta;
    }

    fn shift_flag(&self) -> bool {
        self.shift
    }

    fn clear_shift_flag(&mut self) {
        self.shift = false;
    }

    fn control_flag(&self) -> bool {
        self.control
    }

    fn clear_control_flag(&mut self) {
        self.control = false;
    }

    fn touch_count(&self) -> u32 {
        self.touches
    }
}
