use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{Instrument, info, info_span};

use crate::state::AppState;

/// Tells clients whether a reply came from a model or from the mock.
pub const REPLY_SOURCE_HEADER: &str = "x-reply-source";

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub text: String,
    pub language: String,
}

impl AskRequest {
    fn validate(&self) -> Result<(), String> {
        if self.text.is_empty() {
            return Err("text must not be empty".to_string());
        }
        if self.language.is_empty() {
            return Err("language must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AskResponse {
    pub input_text: String,
    pub ai_reply: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ai/ask", post(ask))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn ask(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let Json(request) = payload.map_err(|e| (StatusCode::BAD_REQUEST, e.body_text()))?;
    request
        .validate()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let request_id = uuid::Uuid::new_v4();
    let span = info_span!("ask", %request_id, language = %request.language);

    let reply = async {
        let reply = state
            .generator
            .generate_reply(&request.text, &request.language)
            .await;
        info!(
            source = reply.source.as_str(),
            model = reply.source.model().unwrap_or("-"),
            chars = reply.text.chars().count(),
            "reply ready"
        );
        reply
    }
    .instrument(span)
    .await;

    Ok((
        [(REPLY_SOURCE_HEADER, reply.source.as_str())],
        Json(AskResponse {
            input_text: request.text,
            ai_reply: reply.text,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{ReplyGenerator, Strategy};
    use serde_json::json;

    async fn spawn_mock_app() -> String {
        let state = Arc::new(AppState::new(ReplyGenerator::new(Strategy::Mock)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn ask_without_credentials_returns_mock_reply() {
        let base = spawn_mock_app().await;
        let response = reqwest::Client::new()
            .post(format!("{base}/ai/ask"))
            .json(&json!({ "text": "Hello", "language": "es" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["x-reply-source"], "mock");
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(
            body,
            json!({
                "inputText": "Hello",
                "aiReply": "Recibí tu mensaje: \"Hello\". Esta es una respuesta de IA simulada en español."
            })
        );
    }

    #[tokio::test]
    async fn input_text_is_echoed_verbatim() {
        let base = spawn_mock_app().await;
        let text = "  spaced \"quoted\" ✓  ";
        let body: AskResponse = reqwest::Client::new()
            .post(format!("{base}/ai/ask"))
            .json(&json!({ "text": text, "language": "ZH" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body.input_text, text);
        assert!(body.ai_reply.contains(text));
        assert!(body.ai_reply.ends_with("这是中文的模拟AI回复。"));
    }

    #[tokio::test]
    async fn whitespace_text_is_accepted_and_echoed() {
        let base = spawn_mock_app().await;
        let response = reqwest::Client::new()
            .post(format!("{base}/ai/ask"))
            .json(&json!({ "text": "   ", "language": "es" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        let body: AskResponse = response.json().await.unwrap();
        assert_eq!(body.input_text, "   ");
        assert_eq!(
            body.ai_reply,
            "Recibí tu mensaje: \"   \". Esta es una respuesta de IA simulada en español."
        );
    }

    #[tokio::test]
    async fn invalid_input_is_a_client_error() {
        let base = spawn_mock_app().await;
        let client = reqwest::Client::new();

        for payload in [
            json!({ "text": "", "language": "en" }),
            json!({ "text": "Hello", "language": "" }),
            json!({ "language": "en" }),
            json!({ "text": "Hello" }),
            json!({ "text": 42, "language": "en" }),
        ] {
            let response = client
                .post(format!("{base}/ai/ask"))
                .json(&payload)
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 400, "payload: {payload}");
        }

        let response = client
            .post(format!("{base}/ai/ask"))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
    }

    #[tokio::test]
    async fn cors_allows_any_origin_with_credentials() {
        let base = spawn_mock_app().await;
        let response = reqwest::Client::new()
            .post(format!("{base}/ai/ask"))
            .header("origin", "http://flutter.example")
            .json(&json!({ "text": "Hi", "language": "en" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://flutter.example"
        );
        assert_eq!(response.headers()["access-control-allow-credentials"], "true");
    }
}
