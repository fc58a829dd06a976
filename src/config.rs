//! Detector configuration read from an s-expression plist.
//!
//! ```text
//! (:pitch-threshold 0.04 :yaw-threshold 0.04 :cooldown-ms 500
//!  :pitch-sign positive-is-up :diagnostic-interval 10)
//! ```
//!
//! Everything except `:pitch-sign` falls back to the detector defaults.

use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::MotionError;
use crate::motion::{DetectorConfig, PitchSignConvention};
use crate::sexp::{get_float, get_keyword};

/// Parse a config plist.
pub fn parse_config(raw: &str) -> Result<DetectorConfig, MotionError> {
    let value = lexpr::from_str(raw)
        .map_err(|e| MotionError::Config(format!("malformed s-expression: {e}")))?;

    let sign = get_keyword(&value, "pitch-sign")
        .ok_or_else(|| MotionError::Config("missing :pitch-sign".into()))?;
    let sign = PitchSignConvention::from_str(&sign).ok_or_else(|| {
        MotionError::Config(format!(
            "unknown :pitch-sign {sign:?} (use positive-is-up or positive-is-down)"
        ))
    })?;

    let mut config = DetectorConfig::new(sign);
    if let Some(v) = float_field(&value, "pitch-threshold")? {
        config.pitch_threshold = v;
    }
    if let Some(v) = float_field(&value, "yaw-threshold")? {
        config.yaw_threshold = v;
    }
    if let Some(ms) = float_field(&value, "cooldown-ms")? {
        if !ms.is_finite() || ms < 0.0 {
            return Err(MotionError::Config(format!(
                ":cooldown-ms must be a non-negative number (got {ms})"
            )));
        }
        config.cooldown = Duration::from_nanos((ms * 1_000_000.0).round() as u64);
    }
    if let Some(raw) = get_keyword(&value, "diagnostic-interval") {
        config.diagnostic_interval = match raw.as_str() {
            "nil" => None,
            n => Some(n.parse::<u32>().map_err(|_| {
                MotionError::Config(format!(
                    ":diagnostic-interval must be nil or a non-negative integer (got {n})"
                ))
            })?),
        };
    }

    config.validate()?;
    debug!("Parsed detector config: {}", config.to_sexp());
    Ok(config)
}

/// Read and parse a config file.
pub fn load_config(path: &Path) -> Result<DetectorConfig, MotionError> {
    let raw = std::fs::read_to_string(path)?;
    let config = parse_config(&raw)?;
    info!("Loaded detector config from {}", path.display());
    Ok(config)
}

/// A present-but-unparseable number is an error, not a silent default.
fn float_field(value: &lexpr::Value, key: &str) -> Result<Option<f64>, MotionError> {
    match get_keyword(value, key) {
        None => Ok(None),
        Some(_) => get_float(value, key)
            .map(Some)
            .ok_or_else(|| MotionError::Config(format!(":{key} must be a number"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let cfg = parse_config(
            "(:pitch-threshold 0.3 :yaw-threshold 0.25 :cooldown-ms 750 \
             :pitch-sign positive-is-down :diagnostic-interval 5)",
        )
        .unwrap();
        assert_eq!(cfg.pitch_threshold, 0.3);
        assert_eq!(cfg.yaw_threshold, 0.25);
        assert_eq!(cfg.cooldown, Duration::from_millis(750));
        assert_eq!(cfg.pitch_sign_convention, PitchSignConvention::PositiveIsDown);
        assert_eq!(cfg.diagnostic_interval, Some(5));
    }

    #[test]
    fn test_parse_defaults() {
        let cfg = parse_config("(:pitch-sign positive-is-up)").unwrap();
        assert_eq!(cfg, DetectorConfig::new(PitchSignConvention::PositiveIsUp));
    }

    #[test]
    fn test_parse_keyword_sign_and_nil_interval() {
        let cfg = parse_config("(:pitch-sign :positive-is-up :diagnostic-interval nil)").unwrap();
        assert_eq!(cfg.pitch_sign_convention, PitchSignConvention::PositiveIsUp);
        assert_eq!(cfg.diagnostic_interval, None);
    }

    #[test]
    fn test_missing_sign_is_error() {
        let err = parse_config("(:pitch-threshold 0.1)").unwrap_err();
        assert!(err.to_string().contains("missing :pitch-sign"));
    }

    #[test]
    fn test_unknown_sign_is_error() {
        let err = parse_config("(:pitch-sign sideways)").unwrap_err();
        assert!(matches!(err, MotionError::Config(_)));
    }

    #[test]
    fn test_bad_values_are_errors() {
        for raw in [
            "(:pitch-sign positive-is-up :pitch-threshold fast)",
            "(:pitch-sign positive-is-up :yaw-threshold -0.2)",
            "(:pitch-sign positive-is-up :cooldown-ms -1)",
            "(:pitch-sign positive-is-up :diagnostic-interval -3)",
            "(:pitch-sign positive-is-up",
        ] {
            assert!(
                matches!(parse_config(raw), Err(MotionError::Config(_))),
                "expected config error for {raw}"
            );
        }
    }

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(:pitch-sign positive-is-down :cooldown-ms 200)").unwrap();
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.cooldown, Duration::from_millis(200));
        assert_eq!(cfg.pitch_sign_convention, PitchSignConvention::PositiveIsDown);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config(Path::new("/nonexistent/head-gesture.el")).unwrap_err();
        assert!(matches!(err, MotionError::Io(_)));
    }
}
