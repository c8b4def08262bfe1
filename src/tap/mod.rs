//! macOS event-tap integration
//!
//! Registers the two CGEventTaps (passive gesture tap, mutating filter
//! tap), attaches them to the run loop, and routes every intercepted event
//! into the [`crate::engine::FilterEngine`].

pub mod event_tap;
pub mod permissions;

pub use event_tap::{RunLoopHandle, TapLifecycle};
pub use permissions::{is_trusted, request_trust};
