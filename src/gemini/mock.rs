use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::transport::GenerationService;
use crate::{
    error::{Result, TryOnError},
    models::{GenerateContentRequest, GenerateContentResponse, Part},
};

/// Replays queued outcomes in order and records every request it receives.
#[derive(Default)]
pub struct MockService {
    outcomes: Mutex<VecDeque<Result<GenerateContentResponse>>>,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl MockService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, response: GenerateContentResponse) -> Self {
        self.outcomes.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn respond_parts(self, parts: Vec<Part>) -> Self {
        self.respond(GenerateContentResponse::with_parts(parts))
    }

    pub fn fail(self, message: &str) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(TryOnError::Transport(message.to_string())));
        self
    }

    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for MockService {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TryOnError::Transport("mock has no queued response".into())))
    }
}
