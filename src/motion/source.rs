//! Motion sources — where orientation samples come from.
//!
//! The detector never talks to hardware.  A source reports whether sensing
//! is possible and hands over timestamped samples one at a time.
//! `ReplaySource` reads a recorded trace; `UnavailableSource` is the no-op
//! stand-in for hosts with no motion device.

use std::io::BufRead;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::detector::OrientationSample;
use crate::error::MotionError;

/// Capability check exposed by anything that can deliver head motion.
pub trait SensingCapability {
    fn is_sensing_available(&self) -> bool;
}

/// A sample paired with the time it was taken on the source clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSample {
    pub sample: OrientationSample,
    pub timestamp: Duration,
}

/// Convert seconds to a timestamp, rounded to the nearest nanosecond so
/// decimal trace times subtract exactly.  None for negative or non-finite
/// input.
pub fn timestamp_from_secs(secs: f64) -> Option<Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    let nanos = (secs * 1e9).round();
    if nanos >= u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(nanos as u64))
}

/// Pull-style stream of orientation updates.
pub trait MotionSource: SensingCapability {
    /// Next update, `None` once the stream has ended.  An `Err` affects
    /// only that update; the stream may continue afterwards.
    fn next_update(&mut self) -> Option<Result<TimedSample, MotionError>>;
}

// ── Replay ─────────────────────────────────────────────────

/// Replays a text trace: one `<seconds> <pitch> <yaw>` triple per line.
/// Blank lines and `#` comments are skipped.
pub struct ReplaySource<R> {
    reader: R,
    line_no: usize,
    buf: String,
    finished: bool,
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        info!("Replay motion source opened");
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
            finished: false,
        }
    }
}

impl<R: BufRead> SensingCapability for ReplaySource<R> {
    fn is_sensing_available(&self) -> bool {
        true
    }
}

impl<R: BufRead> MotionSource for ReplaySource<R> {
    fn next_update(&mut self) -> Option<Result<TimedSample, MotionError>> {
        if self.finished {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => {
                    debug!(lines = self.line_no, "Replay trace exhausted");
                    self.finished = true;
                    return None;
                }
                Ok(_) => {
                    self.line_no += 1;
                    let line = self.buf.trim();
                    if line.is_empty() || line.starts_with('#') {
                        continue;
                    }
                    let parsed = parse_line(line).map_err(|reason| {
                        warn!(line = self.line_no, "skipping bad replay line: {}", reason);
                        MotionError::InvalidSample {
                            line: self.line_no,
                            reason,
                        }
                    });
                    return Some(parsed);
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }
}

/// Parse one trace line into a timed sample.
pub fn parse_line(line: &str) -> Result<TimedSample, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return Err(format!("expected 3 fields, got {}", fields.len()));
    }
    let mut values = [0.0f64; 3];
    for (slot, (name, raw)) in values
        .iter_mut()
        .zip(["timestamp", "pitch", "yaw"].iter().zip(fields.iter()))
    {
        *slot = raw
            .parse::<f64>()
            .map_err(|e| format!("bad {name} {raw:?}: {e}"))?;
    }
    let [secs, pitch, yaw] = values;
    let timestamp = timestamp_from_secs(secs)
        .ok_or_else(|| format!("bad timestamp {secs}: must be finite and non-negative"))?;
    Ok(TimedSample {
        sample: OrientationSample::new(pitch, yaw),
        timestamp,
    })
}

// ── Stub ───────────────────────────────────────────────────

/// Source used when no motion device is present.  Never yields samples.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableSource;

impl SensingCapability for UnavailableSource {
    fn is_sensing_available(&self) -> bool {
        false
    }
}

impl MotionSource for UnavailableSource {
    fn next_update(&mut self) -> Option<Result<TimedSample, MotionError>> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_line() {
        let ts = parse_line("0.100  0.5\t-0.25").unwrap();
        assert_eq!(ts.timestamp, Duration::from_millis(100));
        assert_eq!(ts.sample, OrientationSample::new(0.5, -0.25));
    }

    #[test]
    fn test_parse_line_errors() {
        assert_eq!(parse_line("0.1 0.2").unwrap_err(), "expected 3 fields, got 2");
        let err = parse_line("0.1 up 0.2").unwrap_err();
        assert!(err.starts_with("bad pitch \"up\""), "got {err}");
        for raw in ["-0.5 0 0", "inf 0 0", "NaN 0 0"] {
            let err = parse_line(raw).unwrap_err();
            assert!(
                err.starts_with("bad timestamp"),
                "Expected timestamp error for {raw}, got {err}"
            );
        }
    }

    #[test]
    fn test_timestamp_rounds_to_nanos() {
        let a = timestamp_from_secs(0.1).unwrap();
        let b = timestamp_from_secs(0.4).unwrap();
        assert_eq!(b - a, Duration::from_millis(300));
        assert_eq!(timestamp_from_secs(0.0), Some(Duration::ZERO));
        assert_eq!(timestamp_from_secs(-1e-3), None);
        assert_eq!(timestamp_from_secs(f64::INFINITY), None);
    }

    #[test]
    fn test_parse_line_accepts_nan() {
        let ts = parse_line("1 NaN inf").unwrap();
        assert!(ts.sample.pitch.is_nan());
        assert!(ts.sample.yaw.is_infinite());
    }

    #[test]
    fn test_replay_skips_comments_and_blanks() {
        let trace = "# t pitch yaw\n0.0 0.0 0.0\n\n   \n0.1 0.5 0.0\n";
        let mut src = ReplaySource::new(Cursor::new(trace));
        assert!(src.is_sensing_available());
        let a = src.next_update().unwrap().unwrap();
        let b = src.next_update().unwrap().unwrap();
        assert_eq!(a.timestamp, Duration::ZERO);
        assert_eq!(b.sample.pitch, 0.5);
        assert!(src.next_update().is_none());
        assert!(src.next_update().is_none());
    }

    #[test]
    fn test_replay_reports_bad_line_and_continues() {
        let trace = "0.0 0.0 0.0\ngarbage\n0.2 0.1 0.1\n";
        let mut src = ReplaySource::new(Cursor::new(trace));
        assert!(src.next_update().unwrap().is_ok());
        match src.next_update().unwrap() {
            Err(MotionError::InvalidSample { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected InvalidSample, got {other:?}"),
        }
        let c = src.next_update().unwrap().unwrap();
        assert_eq!(c.timestamp, Duration::from_millis(200));
    }

    #[test]
    fn test_unavailable_source() {
        let mut src = UnavailableSource;
        assert!(!src.is_sensing_available());
        assert!(src.next_update().is_none());
    }
}
