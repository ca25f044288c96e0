//! HTTP API gateway for Concierge.
//!
//! Two routes: `POST /prompts` hands a prompt to the orchestrator and
//! `GET /health` reports liveness with the live session count.
//!
//! Built on Axum.

use axum::extract::rejection::JsonRejection;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use concierge_agent::{Orchestrator, Reply};
use concierge_core::event::EventBus;
use concierge_tools::{RestTravelClient, TravelApiError, travel_registry};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info, warn};

/// Request bodies above this are rejected with 413.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const PROMPT_REQUIRED: &str = "prompt is required (string)";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
}

type SharedState = Arc<GatewayState>;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("No model provider configured: {0}")]
    NoProvider(String),

    #[error("Travel API client: {0}")]
    TravelApi(#[from] TravelApiError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    sessions: usize,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

/// Build the Axum router.
///
/// Layers applied:
/// - permissive CORS
/// - request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/prompts", post(prompts_handler))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server.
///
/// Builds the provider, the travel tools and the orchestrator once, starts
/// the idle-session sweeper, then serves until the process stops.
pub async fn start(config: concierge_config::AppConfig) -> Result<(), GatewayError> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let router = concierge_providers::build_from_config(&config);
    let provider = router
        .default()
        .ok_or_else(|| GatewayError::NoProvider(config.default_provider.clone()))?;

    let api = Arc::new(RestTravelClient::from_config(&config.travel_api)?);
    let tools = Arc::new(travel_registry(api));
    let event_bus = Arc::new(EventBus::default());

    let orchestrator = Arc::new(Orchestrator::from_config(
        &config,
        provider,
        tools,
        event_bus.clone(),
    ));

    let sweeper = orchestrator.sessions().clone().spawn_sweeper(
        Duration::from_secs(config.sessions.sweep_interval_secs),
        Duration::from_secs(config.sessions.max_idle_secs),
        event_bus,
    );

    let app = build_router(Arc::new(GatewayState { orchestrator }));

    info!(
        addr = %addr,
        model = %config.default_model,
        travel_api = %config.travel_api.base_url,
        "Gateway starting"
    );
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let served = axum::serve(listener, app).await;
    sweeper.abort();
    served?;

    Ok(())
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.orchestrator.sessions().len().await,
    })
}

async fn prompts_handler(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Reply>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        warn!(error = %rejection, "Unreadable prompt request");
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => api_error(StatusCode::PAYLOAD_TOO_LARGE, rejection.body_text()),
            _ => api_error(StatusCode::BAD_REQUEST, PROMPT_REQUIRED),
        }
    })?;

    let prompt = body
        .get("prompt")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, PROMPT_REQUIRED))?;
    let session_id = body.get("sessionId").and_then(Value::as_str);

    info!(prompt_len = prompt.len(), has_session = session_id.is_some(), "Prompt received");

    match state.orchestrator.handle(prompt, session_id).await {
        Ok(reply) => Ok(Json(reply)),
        Err(e) => {
            error!(error = %e, "Prompt processing failed");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use concierge_agent::{DispatchLoop, FixedPrompt, SessionStore};
    use concierge_core::error::ProviderError;
    use concierge_core::message::Message;
    use concierge_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use concierge_core::tool::ToolRegistry;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// Answers every request with the same text, or fails when `reply` is
    /// `None`.
    struct MockProvider {
        reply: Option<String>,
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            match &self.reply {
                Some(text) => Ok(ProviderResponse {
                    message: Message::assistant(text),
                    usage: None,
                    model: "mock-model".into(),
                }),
                None => Err(ProviderError::Network("connection refused".into())),
            }
        }
    }

    fn test_state(reply: Option<&str>) -> SharedState {
        let bus = Arc::new(EventBus::default());
        let provider = Arc::new(MockProvider {
            reply: reply.map(String::from),
        });
        let dispatch = DispatchLoop::new(provider, "mock-model", 0.7, Arc::new(ToolRegistry::new()), bus.clone());
        let sessions = Arc::new(SessionStore::new(Arc::new(FixedPrompt("sys".into()))));
        Arc::new(GatewayState {
            orchestrator: Arc::new(Orchestrator::new(sessions, dispatch, bus)),
        })
    }

    fn post_prompts(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/prompts")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(Some("hi")));

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, serde_json::json!({ "status": "ok", "sessions": 0 }));
    }

    #[tokio::test]
    async fn prompt_returns_session_and_response() {
        let state = test_state(Some("Where would you like to stay?"));
        let app = build_router(state.clone());

        let response = app
            .oneshot(post_prompts(r#"{"prompt":"I need a hotel"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["response"], "Where would you like to stay?");
        assert!(!body["sessionId"].as_str().unwrap().is_empty());
        assert_eq!(state.orchestrator.sessions().len().await, 1);
    }

    #[tokio::test]
    async fn session_id_is_reused() {
        let app = build_router(test_state(Some("ok")));

        let body = r#"{"prompt":"hello","sessionId":"trip-42"}"#;
        let first = json_body(app.clone().oneshot(post_prompts(body)).await.unwrap()).await;
        let second = json_body(app.oneshot(post_prompts(body)).await.unwrap()).await;
        assert_eq!(first["sessionId"], "trip-42");
        assert_eq!(second["sessionId"], "trip-42");
    }

    #[tokio::test]
    async fn missing_prompt_is_rejected() {
        for body in [r#"{}"#, r#"{"prompt":""}"#, r#"{"prompt":42}"#, "not json"] {
            let app = build_router(test_state(Some("unused")));
            let response = app.oneshot(post_prompts(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(json_body(response).await["error"], PROMPT_REQUIRED);
        }
    }

    #[tokio::test]
    async fn provider_failure_is_500() {
        let app = build_router(test_state(None));

        let response = app.oneshot(post_prompts(r#"{"prompt":"hello"}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router(test_state(Some("unused")));
        let prompt = "x".repeat(MAX_BODY_BYTES + 1);
        let body = serde_json::json!({ "prompt": prompt }).to_string();

        let mut req = post_prompts(body.clone());
        req.headers_mut().insert("content-length", body.len().into());

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn cors_preflight_is_allowed() {
        let app = build_router(test_state(Some("unused")));
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/prompts")
            .header("origin", "http://example.com")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert!(response.status().is_success());
        assert!(response.headers().contains_key("access-control-allow-origin"));
    }
}
