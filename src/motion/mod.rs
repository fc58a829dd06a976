//! Head motion subsystem — gesture detection from orientation samples.
//!
//! Provides:
//! - `detector`: delta thresholds, cooldown, periodic diagnostics
//! - `gesture`: gesture and diagnostic event types
//! - `source`: the sensing capability and sample stream seam
//! - `session`: drives a source through a detector

pub mod detector;
pub mod gesture;
pub mod session;
pub mod source;

pub use detector::{DetectorConfig, GestureDetector, OrientationSample, PitchSignConvention};
pub use gesture::{DiagnosticEvent, Gesture};
pub use session::{MotionEvent, MotionSession};
pub use source::{
    timestamp_from_secs, MotionSource, ReplaySource, SensingCapability, TimedSample,
    UnavailableSource,
};
