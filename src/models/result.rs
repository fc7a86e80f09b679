use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What a caller renders after an invocation: an image or a message,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationResult {
    Image(String),
    Error(String),
}

impl GenerationResult {
    pub fn image_url(&self) -> Option<&str> {
        match self {
            GenerationResult::Image(url) => Some(url),
            GenerationResult::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            GenerationResult::Error(msg) => Some(msg),
            GenerationResult::Image(_) => None,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, GenerationResult::Image(_))
    }
}

impl From<Result<String>> for GenerationResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(url) => GenerationResult::Image(url),
            Err(e) => GenerationResult::Error(e.to_string()),
        }
    }
}

/// Lifecycle of a single invocation. `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    Idle,
    Requesting,
    Succeeded,
    Failed,
}

impl GenerationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationState::Idle => "idle",
            GenerationState::Requesting => "requesting",
            GenerationState::Succeeded => "succeeded",
            GenerationState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Succeeded | GenerationState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TryOnError;

    #[test]
    fn exactly_one_side_is_populated() {
        let ok = GenerationResult::from(Ok("data:image/png;base64,Wg==".to_string()));
        assert_eq!(ok.image_url(), Some("data:image/png;base64,Wg=="));
        assert!(ok.error().is_none());

        let err = GenerationResult::from(Err(TryOnError::NoImageData));
        assert!(err.image_url().is_none());
        assert_eq!(err.error(), Some("no generated image data found"));
        assert!(!err.is_image());
    }

    #[test]
    fn only_finished_states_are_terminal() {
        assert!(!GenerationState::Idle.is_terminal());
        assert!(!GenerationState::Requesting.is_terminal());
        assert!(GenerationState::Succeeded.is_terminal());
        assert!(GenerationState::Failed.is_terminal());
    }
}
