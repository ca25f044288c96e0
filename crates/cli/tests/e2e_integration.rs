//! End-to-end tests for the concierge pipeline.
//!
//! These drive a prompt through the gateway, the orchestrator and the real
//! travel tools, with a scripted model and a mocked travel backend.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use concierge_agent::{ContextBudget, DispatchLoop, FixedPrompt, Orchestrator, SessionStore};
use concierge_config::AppConfig;
use concierge_core::error::ProviderError;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::message::{Message, MessageToolCall, Role, SessionId};
use concierge_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use concierge_gateway::{GatewayState, build_router};
use concierge_tools::{RestTravelClient, travel_registry};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Mock Provider ────────────────────────────────────────────────────────

/// A mock provider that returns scripted responses in sequence and records
/// every request it receives.
struct ScriptedProvider {
    responses: std::sync::Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: std::sync::Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            panic!("ScriptedProvider: no more responses");
        }
        responses.remove(0)
    }
}

fn text_response(text: &str) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 100,
            completion_tokens: 20,
            total_tokens: 120,
        }),
        model: "e2e-model".into(),
    })
}

fn tool_response(tool_calls: Vec<MessageToolCall>) -> Result<ProviderResponse, ProviderError> {
    Ok(ProviderResponse {
        message: Message::assistant_with_tools("", tool_calls),
        usage: None,
        model: "e2e-model".into(),
    })
}

fn tool_call(id: &str, name: &str, args: Value) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: args.to_string(),
    }
}

// ── Wiring ───────────────────────────────────────────────────────────────

struct Harness {
    orchestrator: Arc<Orchestrator>,
    provider: Arc<ScriptedProvider>,
    events: Arc<EventBus>,
}

fn harness(backend: &MockServer, script: Vec<Result<ProviderResponse, ProviderError>>) -> Harness {
    let provider = Arc::new(ScriptedProvider::new(script));
    let api = Arc::new(
        RestTravelClient::new(&backend.uri(), std::time::Duration::from_secs(5)).unwrap(),
    );
    let tools = Arc::new(travel_registry(api));
    let events = Arc::new(EventBus::default());
    let dispatch = DispatchLoop::new(provider.clone(), "e2e-model", 0.2, tools, events.clone());
    let sessions = Arc::new(SessionStore::new(Arc::new(FixedPrompt(
        "You are a travel assistant".into(),
    ))));
    Harness {
        orchestrator: Arc::new(Orchestrator::new(sessions, dispatch, events.clone())),
        provider,
        events,
    }
}

async fn mount_availability(server: &MockServer, rooms: usize) {
    let rooms: Vec<Value> = (0..rooms)
        .map(|i| {
            json!({
                "roomCode": format!("R{i}"),
                "roomName": "Double Room",
                "hotel": { "code": format!("H{i}"), "name": format!("Hotel {i}"), "stars": 4 },
                "price": { "total": "300.00", "currency": "EUR" },
                "cancellationPolicy": { "refundable": true }
            })
        })
        .collect();
    Mock::given(method("POST"))
        .and(path("/api/availability"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "searchId": "abc", "rooms": rooms })),
        )
        .mount(server)
        .await;
}

fn search_args() -> Value {
    json!({
        "destination": "Madrid",
        "checkIn": "2026-11-02",
        "checkOut": "2026-11-05",
        "guests": 2
    })
}

async fn post_prompt(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/prompts")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_search_returns_structured_result() {
    let backend = MockServer::start().await;
    mount_availability(&backend, 2).await;
    let h = harness(
        &backend,
        vec![
            tool_response(vec![tool_call("call_1", "search_accommodation", search_args())]),
            text_response("I found 2 hotels in Madrid."),
        ],
    );

    let reply = h.orchestrator.handle("hotels in Madrid next week", None).await.unwrap();
    assert_eq!(reply.response["success"], true);
    assert_eq!(reply.response["searchId"], "abc");
    assert_eq!(reply.response["resultsCount"], 2);
    assert_eq!(reply.response["results"][0]["hotel"]["name"], "Hotel 0");

    // the model saw the tool result on its second call
    let requests = h.provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tools.len(), 3);
    let tool_msg = requests[1].messages.last().unwrap();
    assert_eq!(tool_msg.role, Role::Tool);
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));
}

#[tokio::test]
async fn e2e_backend_error_reaches_model_not_caller() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/availability"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({ "error": "maintenance" })))
        .mount(&backend)
        .await;
    let h = harness(
        &backend,
        vec![
            tool_response(vec![tool_call("call_1", "search_accommodation", search_args())]),
            text_response("The booking system is down, please try again later."),
        ],
    );

    let reply = h.orchestrator.handle("hotels in Madrid", None).await.unwrap();
    assert_eq!(reply.response, json!("The booking system is down, please try again later."));

    let tool_msg = h.provider.requests()[1].messages.last().unwrap().clone();
    let content: Value = serde_json::from_str(&tool_msg.content).unwrap();
    assert_eq!(content["success"], false);
}

#[tokio::test]
async fn e2e_unknown_and_invalid_tool_calls_are_survivable() {
    let backend = MockServer::start().await;
    let h = harness(
        &backend,
        vec![
            tool_response(vec![
                tool_call("a", "book_flight", json!({})),
                tool_call("b", "search_accommodation", json!({ "destination": "Madrid" })),
            ]),
            text_response("What dates would you like?"),
        ],
    );

    let reply = h.orchestrator.handle("book me something", None).await.unwrap();
    assert_eq!(reply.response, json!("What dates would you like?"));

    let messages = &h.provider.requests()[1].messages;
    let results: Vec<_> = messages.iter().filter(|m| m.role == Role::Tool).collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].tool_call_id.as_deref(), Some("a"));
    assert!(results[0].content.contains("Unknown function: book_flight"));
    assert_eq!(results[1].tool_call_id.as_deref(), Some("b"));
}

#[tokio::test]
async fn e2e_large_search_results_are_compacted_in_later_turns() {
    let backend = MockServer::start().await;
    mount_availability(&backend, 40).await;
    let h = harness(
        &backend,
        vec![
            tool_response(vec![tool_call("call_1", "search_accommodation", search_args())]),
            text_response("Here are the options."),
        ],
    );

    let reply = h.orchestrator.handle("hotels in Madrid", None).await.unwrap();
    assert_eq!(reply.response["resultsCount"], 40);

    // the full tool result went to the model uncompacted within the request
    let tool_msg = h.provider.requests()[1].messages.last().unwrap().clone();
    assert!(tool_msg.content.len() > 8000);

    // and compacts to a three-entry summary
    let summary = ContextBudget::default().compact_tool_result(&tool_msg.content).unwrap();
    let summary: Value = serde_json::from_str(&summary).unwrap();
    assert_eq!(summary["results"].as_array().unwrap().len(), 3);
    assert_eq!(summary["note"], "Showing 3 of 40 results");
}

#[tokio::test]
async fn e2e_overflow_recovers_once() {
    let backend = MockServer::start().await;
    let overflow = || {
        Err(ProviderError::ApiError {
            status_code: 400,
            message: "This model's maximum context length is 128000 tokens".into(),
        })
    };
    let h = harness(
        &backend,
        vec![
            text_response("Hi! Where to?"),
            overflow(),
            text_response("Rome it is."),
        ],
    );
    let mut rx = h.events.subscribe();

    let first = h.orchestrator.handle("hello", Some("trip")).await.unwrap();
    let second = h.orchestrator.handle("Rome", Some("trip")).await.unwrap();
    assert_eq!(first.session_id, second.session_id);
    assert_eq!(second.response, json!("Rome it is."));

    let retry = &h.provider.requests()[2];
    assert_eq!(retry.messages.len(), 2);
    assert_eq!(retry.messages[1].content, "Rome");

    let mut recovered = false;
    while let Ok(event) = rx.try_recv() {
        recovered |= matches!(event.as_ref(), DomainEvent::OverflowRecovered { .. });
    }
    assert!(recovered);

    let session = h.orchestrator.sessions().get(&SessionId::from("trip")).await.unwrap();
    assert_eq!(session.messages.len(), 3);
}

#[tokio::test]
async fn e2e_gateway_prompt_and_health() {
    let backend = MockServer::start().await;
    mount_availability(&backend, 1).await;
    let h = harness(
        &backend,
        vec![
            text_response("Which city?"),
            tool_response(vec![tool_call("call_1", "search_accommodation", search_args())]),
            text_response("Found one."),
        ],
    );
    let app = build_router(Arc::new(GatewayState {
        orchestrator: h.orchestrator.clone(),
    }));

    let (status, body) = post_prompt(app.clone(), json!({ "prompt": "I want a hotel" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "Which city?");
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let (status, body) = post_prompt(
        app.clone(),
        json!({ "prompt": "Madrid, 2-5 November", "sessionId": session_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sessionId"], session_id.as_str());
    assert_eq!(body["response"]["searchId"], "abc");

    let (status, body) = post_prompt(app.clone(), json!({ "sessionId": session_id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "prompt is required (string)");

    let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(req).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health, json!({ "status": "ok", "sessions": 1 }));
}

#[tokio::test]
async fn e2e_orchestrator_from_config() {
    let backend = MockServer::start().await;
    let mut config = AppConfig::default();
    config.assistant.system_prompt_override = Some("Custom prompt".into());
    config.agent.max_rounds = 1;

    // flights are not offered, so the call fails and nothing is captured
    let provider = Arc::new(ScriptedProvider::new(vec![tool_response(vec![tool_call(
        "call_1",
        "get_flight_list",
        json!({ "origin": "MAD" }),
    )])]));
    let api = Arc::new(RestTravelClient::new(&backend.uri(), std::time::Duration::from_secs(5)).unwrap());
    let orchestrator = Orchestrator::from_config(
        &config,
        provider.clone(),
        Arc::new(travel_registry(api)),
        Arc::new(EventBus::default()),
    );

    let reply = orchestrator.handle("flights to Rome", None).await.unwrap();
    assert_eq!(reply.response, json!(concierge_agent::MAX_ROUNDS_REPLY));

    let request = &provider.requests()[0];
    assert_eq!(request.model, config.default_model);
    assert_eq!(request.messages[0].content, "Custom prompt");
}
