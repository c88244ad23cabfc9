// Error taxonomy for the wrapper and the reconciliation scan
// WHY: callers distinguish bad options from tool failures from unusable markup

use thiserror::Error;

/// Result type for heideltime operations
pub type Result<T> = std::result::Result<T, HeidelTimeError>;

/// Errors raised by option validation, tool invocation and reconciliation
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HeidelTimeError {
    /// An option value was rejected before anything was invoked
    #[error("configuration error: {0}")]
    Configuration(String),

    /// HeidelTime could not be started, failed, or produced unusable output
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// The markup did not contain the expected container element
    #[error("malformed output: {0} (check that the output format is TIMEML)")]
    MalformedOutput(String),

    /// Strict scan: a tag's text does not occur anywhere in the container text
    #[error("annotation {index} text {text:?} not found after character {offset}")]
    OffsetNotFound {
        index: usize,
        text: String,
        offset: usize,
    },

    /// Strict scan: a tag's text only occurs before the cursor, so tags are out of document order
    #[error("annotation {index} text {text:?} only occurs before character {offset}; tags are out of document order")]
    OrderViolation {
        index: usize,
        text: String,
        offset: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HeidelTimeError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        HeidelTimeError::Configuration(msg.into())
    }

    pub fn external_tool(msg: impl Into<String>) -> Self {
        HeidelTimeError::ExternalTool(msg.into())
    }

    pub fn malformed_output(msg: impl Into<String>) -> Self {
        HeidelTimeError::MalformedOutput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_output_mentions_format() {
        let error = HeidelTimeError::malformed_output("no <TimeML> element");
        let message = error.to_string();
        assert!(message.contains("no <TimeML> element"));
        assert!(message.contains("TIMEML"));
    }

    #[test]
    fn test_offset_not_found_display() {
        let error = HeidelTimeError::OffsetNotFound {
            index: 2,
            text: "tomorrow".to_string(),
            offset: 17,
        };
        assert_eq!(
            error.to_string(),
            "annotation 2 text \"tomorrow\" not found after character 17"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let error: HeidelTimeError = io.into();
        assert!(matches!(error, HeidelTimeError::Io(_)));
    }
}
