//! # scrolltap
//!
//! A system-wide pointer-input filter for macOS. scrolltap intercepts
//! scroll-wheel and click events before they reach any application,
//! reclassifies the originating device (mouse wheel vs. trackpad) from timing
//! and touch-activity signals, and rewrites event payloads accordingly:
//! axis remap, sign inversion, magnitude scaling, and modifier-flag
//! stripping.
//!
//! ## Overview
//!
//! macOS does not expose device identity at the event-tap layer, so the
//! engine fuses two noisy signals: the per-event continuous-scroll flag and
//! the recency of multi-finger touch activity observed on a passive gesture
//! tap. The decision runs synchronously inside the tap callback on every
//! scroll event, so the whole path is O(1) arithmetic with no allocation
//! and no I/O.
//!
//! ## Event Pipeline
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌──────────────────┐
//! │ gesture tap  │────▶│ TouchActivity │     │                  │
//! │ (listen-only)│     │   Tracker     │────▶│ SourceClassifier │
//! └──────────────┘     └───────────────┘     └────────┬─────────┘
//! ┌──────────────┐                                    ▼
//! │ filter tap   │  scroll events         ┌───────────────────┐
//! │ (mutating)   │───────────────────────▶│ ScrollTransformer │──▶ OS
//! │              │  primary clicks        ├───────────────────┤
//! └──────────────┘───────────────────────▶│ ModifierSanitizer │──▶ OS
//!                                         └───────────────────┘
//! ```
//!
//! ## Architecture
//!
//! - [`engine`]: the classification-and-transform core, OS-independent and
//!   tested against plain in-memory events
//! - [`time`]: monotonic nanosecond timebase (mach_absolute_time on macOS)
//! - [`tap`]: CGEventTap registration, run-loop attachment, and the
//!   callbacks that feed the engine (macOS only)
//! - [`app`]: CLI and the process-lifetime configuration constants
//!
//! ## Permissions
//!
//! Requires Accessibility permission:
//! System Settings → Privacy & Security → Accessibility.

pub mod app;
pub mod engine;
#[cfg(target_os = "macos")]
pub mod tap;
pub mod time;

// Re-export commonly used types
pub use app::config::FilterConfig;
pub use engine::{Action, EventKind, FilterEngine, PointerEvent, ScrollSource, SyntheticEvent};
pub use time::timebase::MachTimebase;

/// Result type alias for scrolltap
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for scrolltap
///
/// All variants are terminal startup failures; once the taps are active the
/// engine is pure arithmetic over already-validated fields and does not fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("accessibility permission not granted")]
    PermissionDenied,

    #[error("event tap creation failed: {0}")]
    TapCreation(String),

    #[error("configuration error: {0}")]
    Config(String),
}
