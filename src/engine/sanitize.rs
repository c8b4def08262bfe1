//! Click modifier sanitizing
//!
//! Strips the control flag from primary-button-down events so a plain left
//! click is never reinterpreted as a control-click (context menu) by the
//! application underneath.

use super::event::PointerEvent;

/// Stateless click sanitizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModifierSanitizer;

impl ModifierSanitizer {
    /// Clear the control flag if set. Applied only to primary-button-down
    /// events; no other effect.
    pub fn sanitize_click(&self, event: &mut impl PointerEvent) {
        if event.control_flag() {
            event.clear_control_flag();
        }
    }
}
