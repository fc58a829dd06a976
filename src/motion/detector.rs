//! Head gesture detection from consecutive orientation samples.
//!
//! Compares each pitch/yaw sample against the previous one and reports a
//! directional gesture when a delta crosses its threshold.  A refractory
//! period after every gesture keeps a single nod from firing repeatedly,
//! and a rolling counter produces a periodic diagnostic line.  Time is
//! passed in by the caller as a `Duration` on the source's clock; nothing
//! here reads the clock.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::gesture::{DiagnosticEvent, Gesture};
use super::source::SensingCapability;
use crate::error::MotionError;
use crate::sexp::bool_sexp;

// ── Samples ────────────────────────────────────────────────

/// One head orientation reading, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    pub pitch: f64,
    pub yaw: f64,
}

impl OrientationSample {
    pub fn new(pitch: f64, yaw: f64) -> Self {
        Self { pitch, yaw }
    }
}

// ── Config ─────────────────────────────────────────────────

/// Which direction of pitch change counts as "up".
///
/// Depends on how the sensing device is mounted, so it is always chosen
/// explicitly rather than defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchSignConvention {
    /// A positive pitch delta is an upward nod.
    PositiveIsUp,
    /// A positive pitch delta is a downward nod.
    PositiveIsDown,
}

impl PitchSignConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PositiveIsUp => "positive-is-up",
            Self::PositiveIsDown => "positive-is-down",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "positive-is-up" => Some(Self::PositiveIsUp),
            "positive-is-down" => Some(Self::PositiveIsDown),
            _ => None,
        }
    }

    /// Map a pitch delta onto Up/Down under this convention.
    fn classify(&self, pitch_delta: f64) -> Gesture {
        let positive = pitch_delta > 0.0;
        match (self, positive) {
            (Self::PositiveIsUp, true) | (Self::PositiveIsDown, false) => Gesture::Up,
            (Self::PositiveIsUp, false) | (Self::PositiveIsDown, true) => Gesture::Down,
        }
    }
}

/// Thresholds and timing for gesture detection.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Minimum |pitch delta| (radians) between samples for Up/Down.
    pub pitch_threshold: f64,
    /// Minimum |yaw delta| (radians) between samples for Left/Right.
    pub yaw_threshold: f64,
    /// A gesture may fire only once strictly more than this has elapsed
    /// since the previous one.
    pub cooldown: Duration,
    /// Pitch polarity.
    pub pitch_sign_convention: PitchSignConvention,
    /// Emit a diagnostic every N samples.  `None` or `Some(0)` disables.
    pub diagnostic_interval: Option<u32>,
}

impl DetectorConfig {
    /// About 2.3 degrees per sample.
    pub const DEFAULT_THRESHOLD_RAD: f64 = 0.04;
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);
    pub const DEFAULT_DIAGNOSTIC_INTERVAL: u32 = 10;

    /// Default thresholds and timing with the given pitch polarity.
    pub fn new(pitch_sign_convention: PitchSignConvention) -> Self {
        Self {
            pitch_threshold: Self::DEFAULT_THRESHOLD_RAD,
            yaw_threshold: Self::DEFAULT_THRESHOLD_RAD,
            cooldown: Self::DEFAULT_COOLDOWN,
            pitch_sign_convention,
            diagnostic_interval: Some(Self::DEFAULT_DIAGNOSTIC_INTERVAL),
        }
    }

    /// Whether diagnostics are produced at all.
    pub fn diagnostics_enabled(&self) -> bool {
        matches!(self.diagnostic_interval, Some(n) if n > 0)
    }

    /// Reject thresholds that would make every comparison meaningless.
    pub fn validate(&self) -> Result<(), MotionError> {
        for (name, value) in [
            ("pitch-threshold", self.pitch_threshold),
            ("yaw-threshold", self.yaw_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(MotionError::Config(format!(
                    "{name} must be a finite, non-negative number of radians (got {value})"
                )));
            }
        }
        Ok(())
    }

    /// Generate s-expression for IPC config.
    pub fn to_sexp(&self) -> String {
        let interval = match self.diagnostic_interval {
            Some(n) if n > 0 => n.to_string(),
            _ => "nil".to_string(),
        };
        format!(
            "(:pitch-threshold {:.3} :yaw-threshold {:.3} :cooldown-ms {} :pitch-sign :{} :diagnostic-interval {})",
            self.pitch_threshold,
            self.yaw_threshold,
            self.cooldown.as_millis(),
            self.pitch_sign_convention.as_str(),
            interval,
        )
    }
}

// ── Detector ───────────────────────────────────────────────

/// Turns a stream of orientation samples into directional gestures.
///
/// Not thread-safe by itself; the `&mut self` receivers mean callers
/// serialize access.
#[derive(Debug)]
pub struct GestureDetector {
    config: DetectorConfig,
    /// Last sample seen, or None before the first one.
    previous_sample: Option<OrientationSample>,
    /// Source-clock time of the last emitted gesture; None means never.
    last_gesture: Option<Duration>,
    /// Samples since the last periodic diagnostic.
    sample_counter: u32,
    running: bool,
    samples_processed: u64,
    gestures_emitted: u64,
}

impl GestureDetector {
    pub fn new(config: DetectorConfig) -> Self {
        info!(
            pitch_threshold = config.pitch_threshold,
            yaw_threshold = config.yaw_threshold,
            cooldown_ms = config.cooldown.as_millis() as u64,
            pitch_sign = config.pitch_sign_convention.as_str(),
            "Head gesture detector initialized"
        );
        Self {
            config,
            previous_sample: None,
            last_gesture: None,
            sample_counter: 0,
            running: false,
            samples_processed: 0,
            gestures_emitted: 0,
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The most recent sample, if any has arrived since the last reset.
    pub fn previous_sample(&self) -> Option<OrientationSample> {
        self.previous_sample
    }

    /// Begin a sampling run.  Fails if the upstream source cannot sense
    /// head motion; the detector stays usable either way.
    pub fn start<C>(&mut self, capability: &C) -> Result<(), MotionError>
    where
        C: SensingCapability + ?Sized,
    {
        if !capability.is_sensing_available() {
            warn!("Head motion sensing unavailable; detector not started");
            return Err(MotionError::DeviceUnavailable);
        }
        self.reset();
        self.running = true;
        info!("Head gesture detection started");
        Ok(())
    }

    /// End a sampling run.  The next sample after a restart is treated as
    /// a fresh baseline.
    pub fn stop(&mut self) {
        self.reset();
        self.running = false;
        info!("Head gesture detection stopped");
    }

    /// Clear per-run state.  `last_gesture` survives so a motion that
    /// spans a stop/start boundary is still inside its cooldown.
    fn reset(&mut self) {
        self.previous_sample = None;
        self.sample_counter = 0;
        self.samples_processed = 0;
        self.gestures_emitted = 0;
    }

    /// Feed one sample taken at `now` (source clock).
    ///
    /// Returns at most one gesture plus an optional diagnostic.  Never
    /// fails: a NaN in the input yields NaN deltas, which compare false
    /// against every threshold.
    pub fn process_sample(
        &mut self,
        sample: OrientationSample,
        now: Duration,
    ) -> (Option<Gesture>, Option<DiagnosticEvent>) {
        self.samples_processed += 1;

        let Some(previous) = self.previous_sample.replace(sample) else {
            let diagnostic = self.config.diagnostics_enabled().then(|| {
                DiagnosticEvent::new(format!(
                    "first sample received pitch={:.3} yaw={:.3}",
                    sample.pitch, sample.yaw
                ))
            });
            return (None, diagnostic);
        };

        let pitch_delta = sample.pitch - previous.pitch;
        let yaw_delta = sample.yaw - previous.yaw;

        let diagnostic = self.tick_diagnostic(sample, pitch_delta, yaw_delta);

        if let Some(last) = self.last_gesture {
            match now.checked_sub(last) {
                Some(elapsed) if elapsed > self.config.cooldown => {}
                // Inside the cooldown, or the clock went backwards.
                _ => return (None, diagnostic),
            }
        }

        let gesture = if pitch_delta.abs() > self.config.pitch_threshold {
            self.config.pitch_sign_convention.classify(pitch_delta)
        } else if yaw_delta.abs() > self.config.yaw_threshold {
            if yaw_delta > 0.0 {
                Gesture::Left
            } else {
                Gesture::Right
            }
        } else {
            return (None, diagnostic);
        };

        self.last_gesture = Some(now);
        self.gestures_emitted += 1;
        debug!(
            "Head gesture: {} at {:.3}s (pitch Δ={:+.3}, yaw Δ={:+.3})",
            gesture,
            now.as_secs_f64(),
            pitch_delta,
            yaw_delta
        );
        (Some(gesture), diagnostic)
    }

    /// Advance the rolling counter and build the periodic summary when it
    /// comes due.
    fn tick_diagnostic(
        &mut self,
        sample: OrientationSample,
        pitch_delta: f64,
        yaw_delta: f64,
    ) -> Option<DiagnosticEvent> {
        self.sample_counter = self.sample_counter.wrapping_add(1);
        let interval = self.config.diagnostic_interval.filter(|n| *n > 0)?;
        if self.sample_counter < interval {
            return None;
        }
        self.sample_counter = 0;
        Some(DiagnosticEvent::new(format!(
            "pitch={:.3} Δ={:+.3} | yaw={:.3} Δ={:+.3}",
            sample.pitch, pitch_delta, sample.yaw, yaw_delta
        )))
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        let last = self
            .last_gesture
            .map(|t| format!("{:.3}", t.as_secs_f64()))
            .unwrap_or_else(|| "nil".to_string());
        format!(
            "(:running {} :baseline {} :samples {} :gestures {} :last-gesture-s {})",
            bool_sexp(self.running),
            bool_sexp(self.previous_sample.is_some()),
            self.samples_processed,
            self.gestures_emitted,
            last,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
