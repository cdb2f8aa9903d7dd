use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::services::ServeDir;

use crate::direction::Direction;
use crate::state::AppState;
use crate::translate::TranslationResult;

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let system_config = &state.config.system_config;

    Router::new()
        // WebSocket
        .route("/client-ws", get(crate::websocket::websocket_handler))

        // Health check
        .route("/api/health", get(health_check))

        // REST API routes
        .route("/api/translate", post(translate))
        .route("/api/directions", get(directions))

        // The page itself
        .fallback_service(ServeDir::new(&system_config.static_dir))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let translator = state.pipeline.translator();
    Json(json!({
        "status": "ok",
        "provider": translator.provider(),
        "model": translator.model(),
        "uptimeSecs": state.uptime_secs(),
    }))
}

#[derive(Debug, Deserialize)]
struct TranslateBody {
    text: String,
    #[serde(default)]
    direction: Direction,
}

/// One-shot translation outside any session; same contract as the page
async fn translate(
    State(state): State<AppState>,
    Json(body): Json<TranslateBody>,
) -> Json<TranslationResult> {
    Json(state.pipeline.translate(&body.text, body.direction).await)
}

async fn directions() -> Json<Value> {
    let directions: Vec<Value> = Direction::ALL
        .iter()
        .map(|direction| {
            json!({
                "id": direction,
                "source": direction.source().name(),
                "target": direction.target().name(),
                "speechTag": direction.speech_tag(),
                "placeholder": direction.placeholder(),
                "hasReading": direction.wants_reading(),
            })
        })
        .collect();
    Json(json!(directions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::translate::pipeline::mock::{payload, MockTranslator};
    use crate::translate::{TranslateError, TranslationPipeline, ERROR_PLACEHOLDER};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(mock: Arc<MockTranslator>) -> Router {
        let state = AppState::new(Config::default(), TranslationPipeline::new(mock));
        create_routes(&state).with_state(state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_translator() {
        let response = app(Arc::new(MockTranslator::default()))
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["provider"], "mock");
        assert_eq!(json["model"], "mock-model");
        assert!(json["uptimeSecs"].as_i64().unwrap() >= 0);
    }

    #[tokio::test]
    async fn test_translate_thai_to_japanese() {
        let mock = Arc::new(MockTranslator::with_responses(vec![Ok(payload(
            "こんにちは",
            Some("こんにちは"),
        ))]));
        let response = app(mock.clone())
            .oneshot(post_json(
                "/api/translate",
                json!({"text": "สวัสดี", "direction": "TH_TO_JP"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "sourceText": "สวัสดี",
                "translatedText": "こんにちは",
                "reading": "こんにちは"
            })
        );
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_translate_blank_text_skips_service() {
        let mock = Arc::new(MockTranslator::default());
        let response = app(mock.clone())
            .oneshot(post_json("/api/translate", json!({"text": "  "})))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["translatedText"], "");
        assert!(json.get("reading").is_none());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_translate_failure_still_resolves() {
        let mock = Arc::new(MockTranslator::with_responses(vec![Err(
            TranslateError::EmptyResponse,
        )]));
        let response = app(mock)
            .oneshot(post_json(
                "/api/translate",
                json!({"text": "こんにちは", "direction": "JP_TO_TH"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["translatedText"], ERROR_PLACEHOLDER);
    }

    #[tokio::test]
    async fn test_translate_rejects_unknown_direction() {
        let response = app(Arc::new(MockTranslator::default()))
            .oneshot(post_json(
                "/api/translate",
                json!({"text": "x", "direction": "EN_TO_FR"}),
            ))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_directions_lists_both() {
        let response = app(Arc::new(MockTranslator::default()))
            .oneshot(Request::get("/api/directions").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let json = body_json(response).await;
        let list = json.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["id"], "TH_TO_JP");
        assert_eq!(list[0]["speechTag"], "th-TH");
        assert_eq!(list[0]["hasReading"], true);
        assert_eq!(list[1]["id"], "JP_TO_TH");
        assert_eq!(list[1]["placeholder"], "日本語を入力...");
    }
}
