//! Scroll source classification
//!
//! Decides, per scroll event, whether the current scroll stream comes from a
//! mouse wheel or a trackpad. The OS does not expose device identity here,
//! so the classifier fuses the event's continuity flag with touch recency
//! from the gesture tap, and falls back on its previous decision when the
//! evidence is ambiguous. Continuous trackpad scrolling keeps producing
//! events after the fingers lift (momentum/inertia); the hysteresis band
//! between the two time windows prevents momentum-phase events from being
//! misclassified as mouse input.

use super::touch::{TouchActivityTracker, MIN_GESTURE_TOUCHES};

/// The engine's current belief about the hardware generating the scroll
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollSource {
    /// No evidence yet (process start).
    #[default]
    Unknown,
    /// Discrete-notch wheel mouse.
    Mouse,
    /// Trackpad, including momentum-phase events after fingers lift.
    Trackpad,
}

/// Stateful classifier with one piece of carried state: the last decision.
#[derive(Debug)]
pub struct SourceClassifier {
    trackpad_window_nanos: u64,
    mouse_idle_nanos: u64,
    last_source: ScrollSource,
}

impl SourceClassifier {
    /// `trackpad_window_nanos`: a qualifying touch this recent means
    /// trackpad. `mouse_idle_nanos`: touch silence this long means mouse.
    /// Between the two, the previous decision is carried forward.
    pub fn new(trackpad_window_nanos: u64, mouse_idle_nanos: u64) -> Self {
        Self {
            trackpad_window_nanos,
            mouse_idle_nanos,
            last_source: ScrollSource::Unknown,
        }
    }

    /// Classify one scroll event. Consumes the tracker's touch state
    /// (reset-after-read) and updates the carried decision.
    ///
    /// Rules, first match wins:
    /// 1. non-continuous deltas → mouse (wheel hardware never reports
    ///    continuous deltas on this platform)
    /// 2. 2+ touches within the trackpad window → trackpad
    /// 3. touch silence beyond the idle window → mouse
    /// 4. otherwise → previous decision
    pub fn classify(
        &mut self,
        is_continuous: bool,
        now: u64,
        touch: &mut TouchActivityTracker,
    ) -> ScrollSource {
        let source = if !is_continuous {
            ScrollSource::Mouse
        } else {
            let (last_touch, max_touches) = touch.consume();
            let elapsed = now.saturating_sub(last_touch);
            if max_touches >= MIN_GESTURE_TOUCHES && elapsed < self.trackpad_window_nanos {
                ScrollSource::Trackpad
            } else if elapsed > self.mouse_idle_nanos {
                ScrollSource::Mouse
            } else {
                self.last_source
            }
        };
        self.last_source = source;
        source
    }

    /// The most recent decision.
    pub fn last_source(&self) -> ScrollSource {
        self.last_source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1_000_000;
    const TRACKPAD_WINDOW: u64 = 200 * MS;
    const MOUSE_IDLE: u64 = 500 * MS;

    fn classifier() -> SourceClassifier {
        SourceClassifier::new(TRACKPAD_WINDOW, MOUSE_IDLE)
    }

    #[test]
    fn test_initial_state_is_unknown() {
        assert_eq!(classifier().last_source(), ScrollSource::Unknown);
    }

    #[test]
    fn test_non_continuous_is_always_mouse() {
        let mut classifier = classifier();
        let mut touch = TouchActivityTracker::new();

        // Even with a fresh two-finger touch, discrete deltas mean mouse
        touch.on_gesture(2, 1_000 * MS);
        let source = classifier.classify(false, 1_010 * MS, &mut touch);
        assert_eq!(source, ScrollSource::Mouse);
    }

    #[test]
    fn test_fresh_touch_is_trackpad() {
        let mut classifier = classifier();
        let mut touch = TouchActivityTracker::new();

        touch.on_gesture(2, 1_000 * MS);
        let source = classifier.classify(true, 1_000 * MS + 199 * MS, &mut touch);
        assert_eq!(source, ScrollSource::Trackpad);
    }

    #[test]
    fn test_long_idle_is_mouse() {
        let mut classifier = classifier();
        let mut touch = TouchActivityTracker::new();

        touch.on_gesture(2, 1_000 * MS);
        touch.consume();
        let source = classifier.classify(true, 1_000 * MS + 501 * MS, &mut touch);
        assert_eq!(source, ScrollSource::Mouse);
    }

    #[test]
    fn test_ambiguous_band_carries_previous_decision() {
        let mut classifier = classifier();
        let mut touch = TouchActivityTracker::new();

        // Establish trackpad with a fresh touch
        touch.on_gesture(2, 1_000 * MS);
        assert_eq!(
            classifier.classify(true, 1_050 * MS, &mut touch),
            ScrollSource::Trackpad
        );

        // Momentum events at 300ms with no intervening touch: touch count
        // was consumed, elapsed sits in the band, decision is carried
        let source = classifier.classify(true, 1_300 * MS, &mut touch);
        assert_eq!(source, ScrollSource::Trackpad);

        // Hysteresis is idempotent: same inputs, same answer
        let source = classifier.classify(true, 1_300 * MS, &mut touch);
        assert_eq!(source, ScrollSource::Trackpad);
    }

    #[test]
    fn test_ambiguous_band_preserves_unknown() {
        let mut classifier = classifier();
        let mut touch = TouchActivityTracker::new();

        // No touch ever observed; elapsed-since-zero falls inside the band
        let source = classifier.classify(true, 300 * MS, &mut touch);
        assert_eq!(source, ScrollSource::Unknown);
    }

    #[test]
    fn test_stale_touch_count_does_not_classify_trackpad() {
        let mut classifier = classifier();
        let mut touch = TouchActivityTracker::new();

        // A touch well in the past: count qualifies but the window does not
        touch.on_gesture(3, 1_000 * MS);
        let source = classifier.classify(true, 2_000 * MS, &mut touch);
        assert_eq!(source, ScrollSource::Mouse);
    }

    #[test]
    fn test_momentum_then_reclassify_after_idle() {
        let mut classifier = classifier();
        let mut touch = TouchActivityTracker::new();

        touch.on_gesture(2, 0);
        assert_eq!(
            classifier.classify(true, 100 * MS, &mut touch),
            ScrollSource::Trackpad
        );
        assert_eq!(
            classifier.classify(true, 400 * MS, &mut touch),
            ScrollSource::Trackpad
        );
        // Past the idle window the stream is handed back to mouse
        assert_eq!(
            classifier.classify(true, 600 * MS, &mut touch),
            ScrollSource::Mouse
        );
    }

    #[test]
    fn test_now_before_last_touch_saturates() {
        let mut classifier = classifier();
        let mut touch = TouchActivityTracker::new();

        // Gesture and scroll streams are not strictly ordered; a scroll
        // timestamped before the touch reads as elapsed == 0
        touch.on_gesture(2, 1_000 * MS);
        let source = classifier.classify(true, 999 * MS, &mut touch);
        assert_eq!(source, ScrollSource::Trackpad);
    }
}
