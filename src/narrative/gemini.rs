//! Google Gemini `generateContent` client

use async_trait::async_trait;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{GenerationRequest, NarrativeClient, ResponseFormat};

/// Gemini API request structures
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiRequestContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiRequestContent {
    parts: Vec<GeminiRequestPart>,
}

#[derive(Debug, Serialize)]
struct GeminiRequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
}

/// Gemini API response structures
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: &str, endpoint: &str) -> Self {
        Self {
            api_key,
            model: model.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self) -> String {
        format!("{}/{}:generateContent?key={}", self.endpoint, self.model, self.api_key)
    }
}

fn build_request(request: &GenerationRequest) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiRequestContent {
            parts: vec![GeminiRequestPart {
                text: request.prompt.clone(),
            }],
        }],
        generation_config: match request.format {
            ResponseFormat::Json => Some(GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
            ResponseFormat::Text => None,
        },
    }
}

/// Concatenated text parts of the first candidate
fn extract_text(response_body: &str) -> Result<String> {
    let response: GeminiResponse = serde_json::from_str(response_body).context("Failed to parse Gemini response")?;

    let text: String = response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| content.parts.iter().filter_map(|p| p.text.as_deref()).collect())
        .unwrap_or_default();

    Ok(text)
}

fn call(url: &str, body: &str) -> Result<String> {
    let mut response = ureq::post(url)
        .header("Content-Type", "application/json")
        .send(body.as_bytes())
        .context("Failed to call Gemini API")?;

    response
        .body_mut()
        .read_to_string()
        .context("Failed to read Gemini response")
}

#[async_trait]
impl NarrativeClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        log::debug!("Generating with {} ({:?})", self.model, request.format);

        let body = serde_json::to_string(&build_request(request)).context("Failed to serialize request")?;
        let url = self.url();

        // ureq blocks; keep it off the event loop thread
        let response_body = tokio::task::spawn_blocking(move || call(&url, &body))
            .await
            .context("Gemini request task failed")??;

        extract_text(&response_body)
    }
}
