use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, SlideshowError>;

/// Errors that can abort a slideshow run
#[derive(Debug, Error)]
pub enum SlideshowError {
    #[error("Input directory does not exist: {0}")]
    InputDirNotFound(PathBuf),

    #[error("No .jpg/.jpeg images found in {0}")]
    NoImages(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid filter graph: {0}")]
    InvalidGraph(String),

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("FFmpeg failed with exit code {}:\n{stderr}", display_code(.code))]
    EncoderFailed { code: Option<i32>, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid progress bar template: {0}")]
    ProgressTemplate(#[from] indicatif::style::TemplateError),
}

impl SlideshowError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub(crate) fn invalid_graph(message: impl Into<String>) -> Self {
        Self::InvalidGraph(message.into())
    }

    /// Exit code reported by the encoder, if this is an encoder failure
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::EncoderFailed { code, .. } => *code,
            _ => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_failure_message_carries_code_and_stderr() {
        let err = SlideshowError::EncoderFailed {
            code: Some(1),
            stderr: "Invalid data found when processing input".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("exit code 1"));
        assert!(message.contains("Invalid data found"));
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_signal_termination_has_no_code() {
        let err = SlideshowError::EncoderFailed {
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("terminated by signal"));
        assert_eq!(err.exit_code(), None);
    }
}
