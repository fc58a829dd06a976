//! Error types shared by the detector, motion sources, and config loader.

use thiserror::Error;

/// Errors surfaced by the motion pipeline.
///
/// None of these are fatal for the process: a detector that failed to start
/// can still be started again once sensing becomes available, and a bad
/// replay line only affects that one sample.
#[derive(Debug, Error)]
pub enum MotionError {
    /// The upstream motion source reports that sensing is unsupported.
    #[error("head motion sensing is not available")]
    DeviceUnavailable,

    /// A replay line could not be parsed into a timestamped sample.
    #[error("invalid sample on line {line}: {reason}")]
    InvalidSample { line: usize, reason: String },

    /// Reading from the underlying stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The detector configuration is malformed or out of range.
    #[error("invalid config: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            MotionError::DeviceUnavailable.to_string(),
            "head motion sensing is not available"
        );
        let err = MotionError::InvalidSample {
            line: 3,
            reason: "expected 3 fields, got 2".into(),
        };
        assert_eq!(err.to_string(), "invalid sample on line 3: expected 3 fields, got 2");
        assert_eq!(
            MotionError::Config("missing :pitch-sign".into()).to_string(),
            "invalid config: missing :pitch-sign"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: MotionError = io.into();
        assert!(matches!(err, MotionError::Io(_)));
    }
}
