use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    /// The sink could not acquire or write to its underlying resource.
    #[error("sink {sink} unavailable: {reason}")]
    SinkUnavailable { sink: String, reason: String },
    /// No sink is registered under this key.
    #[error("no sink registered under key {0:?}")]
    UnknownSink(String),
    #[error("invalid sink key {0:?}")]
    InvalidKey(String),
}

impl LogError {
    pub fn unavailable(sink: impl Into<String>, reason: impl ToString) -> Self {
        Self::SinkUnavailable {
            sink: sink.into(),
            reason: reason.to_string(),
        }
    }
}

#[test]
fn test_error_display() {
    let err = LogError::unavailable("FileSink", "permission denied");
    assert_eq!(err.to_string(), "sink FileSink unavailable: permission denied");
    assert_eq!(
        LogError::InvalidKey(" ".into()).to_string(),
        "invalid sink key \" \""
    );
}
