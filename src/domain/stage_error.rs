use std::fmt;

/// Error carried out of a public crawler entry point, tagged with the step
/// that produced it. Renders as `(stage) -> message`, so wrapping one stage
/// error in another keeps the whole trail.
#[derive(Debug, Clone)]
pub struct StageError {
    stage: &'static str,
    message: String,
}

impl StageError {
    pub fn new(stage: &'static str, message: impl fmt::Display) -> Self {
        StageError {
            stage,
            message: message.to_string(),
        }
    }

    /// Keeps the full context chain of an `anyhow` error in the message.
    pub fn from_anyhow(stage: &'static str, error: anyhow::Error) -> Self {
        StageError {
            stage,
            message: format!("{:#}", error),
        }
    }
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) -> {}", self.stage, self.message)
    }
}

impl std::error::Error for StageError {}
