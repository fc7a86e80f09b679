pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;

pub use config::GeminiConfig;
pub use error::{Result, TryOnError};
pub use gemini::{GeminiClient, GenerationService, HttpTransport, TryOnClient, TryOnSession};
pub use models::*;
