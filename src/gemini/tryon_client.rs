use std::sync::Arc;

use uuid::Uuid;

use super::transport::{GenerationService, HttpTransport};
use crate::{
    config::GeminiConfig,
    error::{Result, TryOnError},
    logger,
    models::{
        normalize, png_data_url, EncodedImage, GenerateContentRequest, GenerateContentResponse,
        GenerationState,
    },
};

pub const TRY_ON_INSTRUCTION: &str = "\
You are a professional fashion photographer and digital artist specializing in virtual try-on.

Task: generate a masterpiece quality, ultra-photorealistic FULL-BODY image of the person from the \
first image wearing the clothing from the second image.

Strict requirements:
1. Full body composition: show the person from head to toe. If the original photo is cropped, \
extend the legs and feet naturally to complete the look.
2. Perfect fit: the clothing must drape naturally over the person's body shape, with believable \
fabric physics, wrinkles, tension and gravity. It must look worn, not pasted on.
3. Identity preservation: keep the person's face, hair, skin tone, pose and expression exactly.
4. High fidelity: sharp focus, cinematic lighting, visible fabric texture (cotton, silk, denim).
5. Lighting consistency: lighting on the clothing must match the person and the environment.

Output ONLY the generated image.";

/// Runs one try-on generation per call. Holds no per-call state, so clones
/// can be shared across tasks freely.
#[derive(Clone)]
pub struct TryOnClient {
    service: Arc<dyn GenerationService>,
}

impl TryOnClient {
    pub fn new(service: Arc<dyn GenerationService>) -> Self {
        Self { service }
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Sends the person and garment images in a single request and returns
    /// the generated picture as a `data:image/png;base64,` URL.
    pub async fn generate_try_on(
        &self,
        person: &EncodedImage,
        garment: &EncodedImage,
    ) -> Result<String> {
        let request_id = Uuid::new_v4();
        let _timer = logger::timer(&format!("try-on [req:{}]", request_id));
        log::info!(
            "👗 Try-on [req:{}] {} -> {}",
            request_id,
            GenerationState::Idle.as_str(),
            GenerationState::Requesting.as_str()
        );

        let person_payload = normalize(person.as_str());
        let garment_payload = normalize(garment.as_str());
        log::debug!(
            "Payload sizes [req:{}]: person={} garment={}",
            request_id,
            person_payload.len(),
            garment_payload.len()
        );

        let request =
            GenerateContentRequest::try_on(person_payload, garment_payload, TRY_ON_INSTRUCTION);

        let outcome = self
            .service
            .generate_content(&request)
            .await
            .and_then(|response| interpret_response(&response));

        match &outcome {
            Ok(url) => log::info!(
                "✅ Try-on [req:{}] {} ({} chars)",
                request_id,
                GenerationState::Succeeded.as_str(),
                url.len()
            ),
            Err(e) => log::error!(
                "❌ Try-on [req:{}] {}: {}",
                request_id,
                GenerationState::Failed.as_str(),
                e
            ),
        }

        outcome
    }
}

/// Picks the result out of a response. Only the first candidate counts. Its
/// first inline image wins outright. Without one, the first non-empty text
/// part is treated as the model's refusal.
pub fn interpret_response(response: &GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        log::warn!("⚠️  Prompt blocked by service: {}", reason);
    }

    let parts = match response.first_candidate_parts() {
        Some(parts) if !parts.is_empty() => parts,
        _ => return Err(TryOnError::EmptyResponse),
    };

    if let Some(image) = parts.iter().find_map(|p| p.as_inline_data()) {
        if image.mime_type != crate::models::PNG_MIME {
            log::debug!("Service declared {}, returning as PNG", image.mime_type);
        }
        return Ok(png_data_url(&image.data));
    }

    match parts
        .iter()
        .find_map(|p| p.as_text().filter(|text| !text.is_empty()))
    {
        Some(text) => Err(TryOnError::ModelRefusal(text.to_string())),
        None => Err(TryOnError::NoImageData),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::mock::MockService;
    use crate::models::{decode_data_url, Candidate, Content, Part};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::json;

    fn mocked(mock: MockService) -> (TryOnClient, Arc<MockService>) {
        let mock = Arc::new(mock);
        (TryOnClient::new(mock.clone()), mock)
    }

    fn person() -> EncodedImage {
        EncodedImage::from("data:image/png;base64,UEVSU09O")
    }

    fn garment() -> EncodedImage {
        EncodedImage::from("R0FSTUVOVA==")
    }

    #[test]
    fn image_after_text_still_wins() {
        let response = GenerateContentResponse::with_parts(vec![
            Part::text("refused"),
            Part::inline_image("image/png", "WA=="),
        ]);
        assert_eq!(interpret_response(&response).unwrap(), "data:image/png;base64,WA==");
    }

    #[test]
    fn first_image_part_is_taken() {
        let response = GenerateContentResponse::with_parts(vec![
            Part::inline_image("image/png", "Rmlyc3Q="),
            Part::inline_image("image/png", "U2Vjb25k"),
        ]);
        assert_eq!(
            interpret_response(&response).unwrap(),
            "data:image/png;base64,Rmlyc3Q="
        );
    }

    #[test]
    fn declared_mime_is_not_forwarded() {
        let response =
            GenerateContentResponse::with_parts(vec![Part::inline_image("image/jpeg", "/9j/")]);
        assert_eq!(interpret_response(&response).unwrap(), "data:image/png;base64,/9j/");
    }

    #[test]
    fn text_only_is_a_refusal() {
        let response = GenerateContentResponse::with_parts(vec![
            Part::Other(json!({ "thought": true })),
            Part::text("refused"),
            Part::text("second"),
        ]);
        assert_eq!(
            interpret_response(&response).unwrap_err(),
            TryOnError::ModelRefusal("refused".into())
        );
    }

    #[test]
    fn empty_text_is_not_a_refusal() {
        let response = GenerateContentResponse::with_parts(vec![Part::text("")]);
        assert_eq!(interpret_response(&response).unwrap_err(), TryOnError::NoImageData);

        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "" }] } }]
        }))
        .unwrap();
        assert_eq!(interpret_response(&response).unwrap_err(), TryOnError::NoImageData);
    }

    #[test]
    fn empty_text_is_skipped_for_later_refusal() {
        let response =
            GenerateContentResponse::with_parts(vec![Part::text(""), Part::text("refused")]);
        assert_eq!(
            interpret_response(&response).unwrap_err(),
            TryOnError::ModelRefusal("refused".into())
        );
    }

    #[test]
    fn no_parts_is_empty_response() {
        let empty = GenerateContentResponse::with_parts(vec![]);
        assert_eq!(interpret_response(&empty).unwrap_err(), TryOnError::EmptyResponse);
        assert_eq!(
            interpret_response(&GenerateContentResponse::default()).unwrap_err(),
            TryOnError::EmptyResponse
        );
    }

    #[test]
    fn blocked_prompt_without_candidates_is_empty_response() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": { "blockReason": "PROHIBITED_CONTENT" }
        }))
        .unwrap();
        assert_eq!(interpret_response(&response).unwrap_err(), TryOnError::EmptyResponse);
    }

    #[test]
    fn parts_without_image_or_text_is_no_image_data() {
        let response = GenerateContentResponse::with_parts(vec![
            Part::Other(json!({})),
            Part::Other(json!({ "functionCall": { "name": "noop" } })),
        ]);
        assert_eq!(interpret_response(&response).unwrap_err(), TryOnError::NoImageData);
    }

    #[test]
    fn later_candidates_are_ignored() {
        let response = GenerateContentResponse {
            candidates: Some(vec![
                Candidate {
                    content: Some(Content {
                        role: None,
                        parts: Some(vec![Part::text("no image for you")]),
                    }),
                    finish_reason: None,
                },
                Candidate {
                    content: Some(Content {
                        role: None,
                        parts: Some(vec![Part::inline_image("image/png", "WA==")]),
                    }),
                    finish_reason: None,
                },
            ]),
            prompt_feedback: None,
        };
        assert_eq!(
            interpret_response(&response).unwrap_err(),
            TryOnError::ModelRefusal("no image for you".into())
        );
    }

    #[tokio::test]
    async fn returns_data_url_for_inline_image() {
        let (client, mock) =
            mocked(MockService::new().respond_parts(vec![Part::inline_image("image/png", "Z")]));

        let url = client.generate_try_on(&person(), &garment()).await.unwrap();
        assert_eq!(url, "data:image/png;base64,Z");
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn request_carries_normalized_images_then_instruction() {
        let (client, mock) =
            mocked(MockService::new().respond_parts(vec![Part::inline_image("image/png", "Z")]));
        client.generate_try_on(&person(), &garment()).await.unwrap();

        let requests = mock.requests();
        let parts = requests[0].parts();
        assert_eq!(parts.len(), 3);

        let first = parts[0].as_inline_data().unwrap();
        assert_eq!(first.mime_type, "image/png");
        assert_eq!(first.data, "UEVSU09O");

        let second = parts[1].as_inline_data().unwrap();
        assert_eq!(second.mime_type, "image/png");
        assert_eq!(second.data, "R0FSTUVOVA==");

        assert_eq!(parts[2].as_text(), Some(TRY_ON_INSTRUCTION));
    }

    #[tokio::test]
    async fn transport_error_message_passes_through() {
        let (client, _) = mocked(MockService::new().fail("network down"));
        let err = client.generate_try_on(&person(), &garment()).await.unwrap_err();
        assert_eq!(err.to_string(), "network down");
    }

    #[tokio::test]
    async fn safety_refusal_surfaces_model_text() {
        let (client, _) = mocked(
            MockService::new().respond_parts(vec![Part::text("blocked by safety filters")]),
        );
        let err = client.generate_try_on(&person(), &garment()).await.unwrap_err();
        assert!(err.to_string().contains("blocked by safety filters"));
    }

    #[tokio::test]
    async fn decoded_result_matches_original_bytes() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let payload = STANDARD.encode(&bytes);
        let (client, _) =
            mocked(MockService::new().respond_parts(vec![Part::inline_image("image/png", payload)]));

        let url = client.generate_try_on(&person(), &garment()).await.unwrap();
        assert_eq!(decode_data_url(&url).unwrap(), bytes);
    }

    #[tokio::test]
    async fn sequential_calls_are_independent() {
        let (client, mock) = mocked(
            MockService::new()
                .fail("network down")
                .respond_parts(vec![Part::inline_image("image/png", "U2Vjb25k")]),
        );

        let first = client
            .generate_try_on(&EncodedImage::from("QQ=="), &EncodedImage::from("Qg=="))
            .await;
        assert_eq!(first.unwrap_err(), TryOnError::Transport("network down".into()));

        let second = client
            .generate_try_on(&EncodedImage::from("Qw=="), &EncodedImage::from("RA=="))
            .await
            .unwrap();
        assert_eq!(second, "data:image/png;base64,U2Vjb25k");

        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].parts()[0].as_inline_data().unwrap().data, "Qw==");
        assert_eq!(requests[1].parts()[1].as_inline_data().unwrap().data, "RA==");
    }

    #[tokio::test]
    async fn overlapping_calls_each_get_one_outcome() {
        let (client, mock) = mocked(
            MockService::new()
                .respond_parts(vec![Part::inline_image("image/png", "WA==")])
                .respond_parts(vec![Part::inline_image("image/png", "WA==")]),
        );

        let (person_image, garment_image) = (person(), garment());
        let (a, b) = futures::join!(
            client.generate_try_on(&person_image, &garment_image),
            client.generate_try_on(&person_image, &garment_image)
        );
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(mock.requests().len(), 2);
    }
}
