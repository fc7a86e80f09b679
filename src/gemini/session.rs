use super::tryon_client::TryOnClient;
use crate::{
    error::TryOnError,
    models::{EncodedImage, GenerationResult},
};

/// Presentation-side state for one try-on form: the two uploads, a loading
/// flag and whatever the last generation produced.
pub struct TryOnSession {
    client: TryOnClient,
    person: Option<EncodedImage>,
    garment: Option<EncodedImage>,
    is_loading: bool,
    result: Option<GenerationResult>,
}

impl TryOnSession {
    pub fn new(client: TryOnClient) -> Self {
        Self {
            client,
            person: None,
            garment: None,
            is_loading: false,
            result: None,
        }
    }

    pub fn set_person(&mut self, image: EncodedImage) {
        self.person = Some(image);
        self.clear_error();
    }

    pub fn set_garment(&mut self, image: EncodedImage) {
        self.garment = Some(image);
        self.clear_error();
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    fn clear_error(&mut self) {
        if matches!(self.result, Some(GenerationResult::Error(_))) {
            self.result = None;
        }
    }

    /// Runs one generation with the current uploads. Nothing is sent when
    /// either image is missing.
    pub async fn generate(&mut self) -> &GenerationResult {
        let (person, garment) = match (&self.person, &self.garment) {
            (Some(person), Some(garment)) => (person.clone(), garment.clone()),
            _ => {
                log::warn!("⚠️  Generate requested before both images were uploaded");
                return self
                    .result
                    .insert(GenerationResult::Error(TryOnError::MissingInput.to_string()));
            }
        };

        self.is_loading = true;
        self.result = None;

        let outcome = self.client.generate_try_on(&person, &garment).await;

        self.is_loading = false;
        self.result.insert(GenerationResult::from(outcome))
    }
}
