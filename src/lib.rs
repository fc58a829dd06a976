//! head-gesture — turns a stream of head orientation samples (pitch, yaw)
//! into discrete up/down/left/right gestures.
//!
//! The detector is a plain state machine: feed it a sample and the time it
//! was taken, get back at most one gesture and an optional diagnostic.
//! Sensor access and presentation live outside this crate.

pub mod config;
pub mod error;
pub mod motion;
pub mod sexp;

pub use error::MotionError;
pub use motion::{
    DetectorConfig, DiagnosticEvent, Gesture, GestureDetector, MotionEvent, MotionSession,
    OrientationSample, PitchSignConvention,
};
