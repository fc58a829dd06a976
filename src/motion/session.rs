//! Motion session — pumps a `MotionSource` through a `GestureDetector` and
//! hands back everything that happened as plain events.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::detector::{DetectorConfig, GestureDetector};
use super::gesture::{DiagnosticEvent, Gesture};
use super::source::MotionSource;
use crate::error::MotionError;
use crate::sexp::{bool_sexp, format_event};

// ── Events ─────────────────────────────────────────────────

/// Events produced by a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionEvent {
    /// A head gesture was recognized.
    Gesture { gesture: Gesture, timestamp: Duration },
    /// Status line for developers.
    Diagnostic(DiagnosticEvent),
}

impl MotionEvent {
    /// Convert the event to an IPC s-expression.
    pub fn to_sexp(&self) -> String {
        match self {
            Self::Gesture { gesture, timestamp } => {
                let gesture = format!(":{}", gesture.as_str());
                let timestamp = format!("{:.3}", timestamp.as_secs_f64());
                format_event(
                    "head-gesture",
                    &[("gesture", gesture.as_str()), ("timestamp", timestamp.as_str())],
                )
            }
            Self::Diagnostic(d) => d.to_sexp(),
        }
    }

    pub fn gesture(&self) -> Option<Gesture> {
        match self {
            Self::Gesture { gesture, .. } => Some(*gesture),
            Self::Diagnostic(_) => None,
        }
    }
}

// ── Session ────────────────────────────────────────────────

/// Owns a detector and the source that feeds it.
pub struct MotionSession<S> {
    source: S,
    detector: GestureDetector,
    source_errors: u64,
}

impl<S: MotionSource> MotionSession<S> {
    pub fn new(source: S, config: DetectorConfig) -> Self {
        Self {
            source,
            detector: GestureDetector::new(config),
            source_errors: 0,
        }
    }

    pub fn detector(&self) -> &GestureDetector {
        &self.detector
    }

    pub fn is_running(&self) -> bool {
        self.detector.is_running()
    }

    /// Start monitoring.  Fails with `DeviceUnavailable` when the source
    /// cannot sense head motion.
    pub fn start(&mut self) -> Result<Vec<MotionEvent>, MotionError> {
        if let Err(e) = self.detector.start(&self.source) {
            warn!("Motion session not started: {}", e);
            return Err(e);
        }
        self.source_errors = 0;
        info!("Motion session started");
        Ok(vec![MotionEvent::Diagnostic(DiagnosticEvent::new(
            "motion monitoring started",
        ))])
    }

    /// Stop monitoring.  Pending source data is left unread.
    pub fn stop(&mut self) {
        if self.detector.is_running() {
            self.detector.stop();
            info!("Motion session stopped");
        }
    }

    /// Pull one update from the source and run it through the detector.
    ///
    /// Returns `None` when the session is stopped or the source has ended.
    /// A diagnostic, if any, precedes the gesture in the returned list.
    pub fn step(&mut self) -> Option<Vec<MotionEvent>> {
        if !self.detector.is_running() {
            return None;
        }
        let mut events = Vec::new();
        match self.source.next_update()? {
            Ok(update) => {
                let (gesture, diagnostic) = self
                    .detector
                    .process_sample(update.sample, update.timestamp);
                if let Some(d) = diagnostic {
                    debug!("{}", d.message);
                    events.push(MotionEvent::Diagnostic(d));
                }
                if let Some(gesture) = gesture {
                    events.push(MotionEvent::Gesture {
                        gesture,
                        timestamp: update.timestamp,
                    });
                }
            }
            Err(e) => {
                self.source_errors += 1;
                events.push(MotionEvent::Diagnostic(DiagnosticEvent::new(format!(
                    "error: {e}"
                ))));
            }
        }
        Some(events)
    }

    /// Drain the source, collecting every event until it ends.
    pub fn run_to_end(&mut self) -> Vec<MotionEvent> {
        let mut events = Vec::new();
        while let Some(batch) = self.step() {
            events.extend(batch);
        }
        events
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:sensing {} :detector {} :source-errors {})",
            bool_sexp(self.source.is_sensing_available()),
            self.detector.status_sexp(),
            self.source_errors,
        )
    }
}
