//! Monotonic timing
//!
//! All engine decisions are made against a monotonic nanosecond clock so the
//! touch-recency windows are immune to wall-clock adjustments.

pub mod timebase;

pub use timebase::MachTimebase;
