//! Scroll delta transformation
//!
//! Applies the shift-axis remap and, for mouse-sourced events only, the
//! per-axis sign inversion and magnitude scaling. Trackpad events pass
//! through untouched beyond the remap so the native acceleration and
//! momentum curves survive.

use super::classifier::ScrollSource;
use super::event::PointerEvent;
use crate::app::config::FilterConfig;

/// In-place scroll transform with per-axis multipliers fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct ScrollTransformer {
    vertical_multiplier: f64,
    horizontal_multiplier: f64,
}

impl ScrollTransformer {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            vertical_multiplier: config.vertical_multiplier(),
            horizontal_multiplier: config.horizontal_multiplier(),
        }
    }

    /// Mutate the event in place. Always succeeds; allocates nothing.
    ///
    /// Step 1, any source: shift-axis remap. The OS convention reassigns
    /// vertical wheel motion to horizontal scroll via shift, but some
    /// hardware paths deliver the raw delta still in the horizontal field;
    /// normalize it into the vertical field and clear the shift flag so it
    /// does not leak downstream.
    ///
    /// Step 2, mouse only: per axis, if the multiplier is not exactly 1.0,
    /// replace the delta with round(delta * multiplier), rounding half away
    /// from zero.
    pub fn transform(&self, event: &mut impl PointerEvent, source: ScrollSource) {
        if event.shift_flag() && event.horizontal_delta() != 0 && event.vertical_delta() == 0 {
            let horizontal = event.horizontal_delta();
            event.set_vertical_delta(horizontal);
            event.set_horizontal_delta(0);
            event.clear_shift_flag();
        }

        if source != ScrollSource::Mouse {
            return;
        }

        if self.vertical_multiplier != 1.0 {
            event.set_vertical_delta(scale(event.vertical_delta(), self.vertical_multiplier));
        }
        if self.horizontal_multiplier != 1.0 {
            event.set_horizontal_delta(scale(event.horizontal_delta(), self.horizontal_multiplier));
        }
    }
}

/// round(delta * multiplier), half away from zero, which is what f64::round
/// does.
#[inline]
fn scale(delta: i64, multiplier: f64) -> i64 {
    (delta as f64 * multiplier).round() as i64
}
