use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, StatusCode,
};

use crate::{
    config::GeminiConfig,
    error::{Result, TryOnError},
    models::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse},
};

/// The outbound half of a generation call: one request in, one response out.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;
}

#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.endpoint(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.api_key {
            let value = HeaderValue::from_str(key)
                .map_err(|e| TryOnError::Transport(format!("invalid API key header: {}", e)))?;
            headers.insert("x-goog-api-key", value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl GenerationService for HttpTransport {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.build_headers()?)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

/// Turns a status and raw body into a response or a `Transport` error.
fn decode_response(status: StatusCode, body: &str) -> Result<GenerateContentResponse> {
    if !status.is_success() {
        return Err(TryOnError::Transport(api_error_message(status, body)));
    }

    serde_json::from_str(body)
        .map_err(|e| TryOnError::Transport(format!("malformed response: {}", e)))
}

/// Prefers the service's own `error.message`; falls back to the status line
/// and raw body.
fn api_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            log::debug!(
                "Gemini error status={:?} code={:?}",
                parsed.error.status,
                parsed.error.code
            );
            parsed.error.message
        }
        _ if body.trim().is_empty() => format!("request failed with status {}", status),
        _ => format!("request failed with status {}: {}", status, body.trim()),
    }
}
