use thiserror::Error;

pub const FALLBACK_MESSAGE: &str = "an error occurred while generating the image, please try again";

/// Every failure a try-on invocation can end in. `Display` is the
/// message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryOnError {
    #[error("{}", transport_message(.0))]
    Transport(String),
    #[error("generation failed: no content returned")]
    EmptyResponse,
    #[error("generation failed: {0}")]
    ModelRefusal(String),
    #[error("no generated image data found")]
    NoImageData,
    #[error("please upload both a person photo and a garment photo")]
    MissingInput,
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("I/O error: {0}")]
    Io(String),
}

fn transport_message(msg: &str) -> &str {
    if msg.trim().is_empty() {
        FALLBACK_MESSAGE
    } else {
        msg
    }
}

impl From<reqwest::Error> for TryOnError {
    fn from(e: reqwest::Error) -> Self {
        TryOnError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TryOnError>;
