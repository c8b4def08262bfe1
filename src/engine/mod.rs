//! Classification-and-transform engine
//!
//! Everything that runs inside the tap callbacks lives here, behind the
//! [`PointerEvent`] accessor trait so it has no dependency on CGEvent and
//! is fully testable with plain records. All mutable state is owned by one
//! [`FilterEngine`] instance constructed at startup; there are no ambient
//! globals and no locks, because the run loop invokes the callbacks
//! strictly serially.

pub mod classifier;
pub mod event;
pub mod sanitize;
pub mod touch;
pub mod transform;

pub use classifier::{ScrollSource, SourceClassifier};
pub use event::{PointerEvent, SyntheticEvent};
pub use sanitize::ModifierSanitizer;
pub use touch::TouchActivityTracker;
pub use transform::ScrollTransformer;

use crate::app::config::FilterConfig;
use tracing::trace;

/// Engine-level event category, mapped from the raw CG event type by the
/// tap layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Touch/gesture notification from the passive tap.
    Gesture,
    /// Scroll-wheel event from the mutating tap.
    Scroll,
    /// Primary-button-down event from the mutating tap.
    PrimaryDown,
    /// Anything the engine does not model.
    Other,
}

/// What the tap callback should do with the event after dispatch.
///
/// The engine itself never yields [`Action::Drop`]: unrecognized events are
/// forwarded unmodified (fail open), and recognized events are forwarded
/// after in-place mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Release the (possibly mutated) event back into the input pipeline.
    Forward,
    /// Swallow the event.
    Drop,
}

/// Owns all mutable filter state and routes every intercepted event.
#[derive(Debug)]
pub struct FilterEngine {
    touch: TouchActivityTracker,
    classifier: SourceClassifier,
    transformer: ScrollTransformer,
    sanitizer: ModifierSanitizer,
}

impl FilterEngine {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            touch: TouchActivityTracker::new(),
            classifier: SourceClassifier::new(
                config.trackpad_window_nanos(),
                config.mouse_idle_nanos(),
            ),
            transformer: ScrollTransformer::new(config),
            sanitizer: ModifierSanitizer,
        }
    }

    /// Process one intercepted event. O(1), no allocation, no I/O beyond a
    /// `trace!`; this sits synchronously on the path of every input event.
    pub fn dispatch(&mut self, kind: EventKind, event: &mut impl PointerEvent) -> Action {
        match kind {
            EventKind::Gesture => {
                self.touch
                    .on_gesture(event.touch_count(), event.timestamp_nanos());
            }
            EventKind::Scroll => {
                let source = self.classifier.classify(
                    event.is_continuous(),
                    event.timestamp_nanos(),
                    &mut self.touch,
                );
                trace!(?source, "scroll event classified");
                self.transformer.transform(event, source);
            }
            EventKind::PrimaryDown => {
                self.sanitizer.sanitize_click(event);
            }
            EventKind::Other => {}
        }
        Action::Forward
    }

    /// The classifier's most recent decision.
    pub fn last_source(&self) -> ScrollSource {
        self.classifier.last_source()
    }
}
