#[cfg(test)]
pub(crate) mod mock;
pub mod session;
pub mod transport;
pub mod tryon_client;

use crate::{config::GeminiConfig, error::Result};
use std::sync::Arc;

pub use session::TryOnSession;
pub use transport::{GenerationService, HttpTransport};
pub use tryon_client::{interpret_response, TryOnClient, TRY_ON_INSTRUCTION};

#[derive(Clone)]
pub struct GeminiClient {
    tryon_client: TryOnClient,
    model: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        log::debug!("Creating Gemini client for model {}", config.model);
        Ok(Self {
            tryon_client: TryOnClient::from_config(&config)?,
            model: config.model,
        })
    }

    /// Uses a caller-supplied service instead of HTTP, e.g. a proxy or a
    /// test double.
    pub fn with_service(service: Arc<dyn GenerationService>, model: impl Into<String>) -> Self {
        Self {
            tryon_client: TryOnClient::new(service),
            model: model.into(),
        }
    }

    pub fn try_on(&self) -> &TryOnClient {
        &self.tryon_client
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn session(&self) -> TryOnSession {
        TryOnSession::new(self.tryon_client.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockService;
    use super::*;
    use crate::models::{EncodedImage, Part};

    #[test]
    fn builds_from_config() {
        let client = GeminiClient::new(GeminiConfig::new().with_model("custom-image")).unwrap();
        assert_eq!(client.model(), "custom-image");
    }

    #[tokio::test]
    async fn sessions_share_the_underlying_service() {
        let mock = Arc::new(
            MockService::new()
                .respond_parts(vec![Part::inline_image("image/png", "QQ==")])
                .respond_parts(vec![Part::inline_image("image/png", "Qg==")]),
        );
        let client = GeminiClient::with_service(mock.clone(), "gemini-2.5-flash-image");

        let direct = client
            .try_on()
            .generate_try_on(&EncodedImage::from("UA=="), &EncodedImage::from("Rw=="))
            .await
            .unwrap();
        assert_eq!(direct, "data:image/png;base64,QQ==");

        let mut session = client.session();
        session.set_person(EncodedImage::from("UA=="));
        session.set_garment(EncodedImage::from("Rw=="));
        assert_eq!(
            session.generate().await.image_url(),
            Some("data:image/png;base64,Qg==")
        );
        assert_eq!(mock.requests().len(), 2);
    }
}
