//! JSON shapes shared by the Gemini REST and Vertex AI `generateContent` endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {}", e)))
}

#[derive(Serialize)]
pub struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

impl GenerateContentRequest {
    /// A single-message `user` conversation.
    pub fn user_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        }
    }
}

#[derive(Deserialize)]
pub struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate.
    pub fn into_text(self) -> Result<String, ApiError> {
        let candidate = self
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| ApiError::Malformed("no candidates".to_string()))?;
        let parts = candidate
            .content
            .and_then(|c| c.parts)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::Malformed("candidate has no content parts".to_string()))?;

        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            return Err(ApiError::EmptyReply);
        }
        Ok(text)
    }
}

#[derive(Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelDescriptor {
    /// Bare model id of a Gemini-family model that can generate content.
    pub fn gemini_id(&self) -> Option<&str> {
        let id = self.name.strip_prefix("models/").unwrap_or(&self.name);
        let generates = self.supported_generation_methods.is_empty()
            || self
                .supported_generation_methods
                .iter()
                .any(|m| m == "generateContent");
        (id.starts_with("gemini") && generates).then_some(id)
    }
}

pub fn build_prompt(text: &str, language: &str) -> String {
    format!(
        "You are a helpful assistant. Reply to the user's message below. \
Your entire reply must be written in the language \"{}\".\n\nUser message:\n{}",
        language, text
    )
}

/// Sends a prepared request and extracts the generated text.
pub async fn send_generate(
    request: reqwest::RequestBuilder,
    body: &GenerateContentRequest,
) -> Result<String, ApiError> {
    let response = request.json(body).send().await?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if !status.is_success() {
        return Err(ApiError::status(status, &body));
    }

    let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
        ApiError::Malformed(format!("{} - body: {}", e, body.chars().take(200).collect::<String>()))
    })?;
    parsed.into_text()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn joins_text_parts_of_first_candidate() {
        let response = parse(json!({
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "Hola, " }, { "text": "amigo." }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }));
        assert_eq!(response.into_text().unwrap(), "Hola, amigo.");
    }

    #[test]
    fn generated_text_is_returned_as_is() {
        let response = parse(json!({
            "candidates": [{ "content": { "parts": [{ "text": "  - one\n" }, { "text": "  - two\n" }] } }]
        }));
        assert_eq!(response.into_text().unwrap(), "  - one\n  - two\n");
    }

    #[test]
    fn missing_shapes_are_malformed() {
        for value in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
            json!({ "candidates": [{ "content": { "role": "model" } }] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
        ] {
            assert!(matches!(parse(value).into_text(), Err(ApiError::Malformed(_))));
        }
    }

    #[test]
    fn blank_text_is_empty_reply() {
        let response = parse(json!({ "candidates": [{ "content": { "parts": [{ "text": "  \n" }] } }] }));
        assert!(matches!(response.into_text(), Err(ApiError::EmptyReply)));
    }

    #[test]
    fn filters_non_gemini_and_non_generating_models() {
        let list: ModelList = serde_json::from_value(json!({
            "models": [
                { "name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"] },
                { "name": "models/embedding-001", "supportedGenerationMethods": ["embedContent"] },
                { "name": "models/gemini-embedding-001", "supportedGenerationMethods": ["embedContent"] },
                { "name": "models/gemini-pro" },
                { "name": "models/aqa", "supportedGenerationMethods": ["generateAnswer"] }
            ]
        }))
        .unwrap();

        let ids: Vec<&str> = list.models.iter().filter_map(|m| m.gemini_id()).collect();
        assert_eq!(ids, vec!["gemini-1.5-flash", "gemini-pro"]);
    }

    #[test]
    fn prompt_names_language_and_embeds_text() {
        let prompt = build_prompt("How are you?", "fr");
        assert!(prompt.contains("\"fr\""));
        assert!(prompt.ends_with("How are you?"));
    }
}
