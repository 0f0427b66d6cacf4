//! End-to-end tests for the chat relay endpoint, with the provider mocked
//! at the HTTP level.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use riseva_core::{Config, FrameDecoder, Secrets, Settings, StreamEvent};
use riseva_gateway::{AppState, create_router};

fn state_with(api_key: Option<&str>, base_url: Option<&str>) -> Arc<AppState> {
    let mut settings = Settings::default();
    if let Some(base_url) = base_url {
        settings.model.base_url = base_url.to_string();
    }
    Arc::new(AppState::from_config(Config {
        secrets: Secrets {
            openai_api_key: api_key.map(str::to_string),
        },
        settings,
    }))
}

fn chat_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_events(response: axum::response::Response) -> Vec<StreamEvent> {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let mut decoder = FrameDecoder::new();
    decoder.push_bytes(&bytes)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = create_router(state_with(None, None));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_messages_is_rejected_before_any_stream() {
    let app = create_router(state_with(Some("sk-test"), None));
    let response = app
        .oneshot(chat_request(json!({"unitName": "Topic"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "messages array is required");
}

#[tokio::test]
async fn non_array_messages_is_rejected() {
    let app = create_router(state_with(Some("sk-test"), None));
    let response = app
        .oneshot(chat_request(json!({"messages": "hi"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "messages array is required");
}

#[tokio::test]
async fn unparseable_body_gets_the_same_json_error_shape() {
    let app = create_router(state_with(Some("sk-test"), None));
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "messages array is required");
}

#[tokio::test]
async fn missing_credential_answers_503_no_api_key() {
    let app = create_router(state_with(None, None));
    let response = app
        .oneshot(chat_request(
            json!({"messages": [{"role": "user", "content": "hi"}]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"], "no_api_key");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn relay_streams_fragments_and_terminates_with_done() {
    let mock_server = MockServer::start().await;
    let sse_body = concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\" world\"},\"finish_reason\":null}]}\n\n",
        "data: [DONE]\n\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"))
        .mount(&mock_server)
        .await;

    let app = create_router(state_with(Some("sk-test"), Some(&mock_server.uri())));

    // 25 messages: only the most recent 20 may be forwarded.
    let messages: Vec<Value> = (0..25)
        .map(|i| json!({"role": "user", "content": format!("m{i}")}))
        .collect();
    let response = app
        .oneshot(chat_request(json!({
            "messages": messages,
            "unitName": "Cell Division",
            "courseName": "AP Biology",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

    let events = body_events(response).await;
    assert_eq!(
        events,
        vec![
            StreamEvent::Content("Hello".to_string()),
            StreamEvent::Content(" world".to_string()),
            StreamEvent::Done,
        ]
    );

    // Inspect what actually reached the provider.
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let provider_body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let forwarded = provider_body["messages"].as_array().unwrap();
    // 20 history messages plus exactly one system message in front.
    assert_eq!(forwarded.len(), 21);
    assert_eq!(forwarded[0]["role"], "system");
    assert_eq!(forwarded[1]["content"], "m5");
    assert_eq!(forwarded[20]["content"], "m24");
    let system_text = forwarded[0]["content"].as_str().unwrap();
    assert!(system_text.contains("\"Cell Division\""));
    assert!(system_text.contains("\"AP Biology\""));
    assert_eq!(provider_body["stream"], true);
    assert_eq!(provider_body["max_tokens"], 800);
}

#[tokio::test]
async fn provider_failure_becomes_in_band_error_frame() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let app = create_router(state_with(Some("sk-test"), Some(&mock_server.uri())));
    let response = app
        .oneshot(chat_request(
            json!({"messages": [{"role": "user", "content": "hi"}]}),
        ))
        .await
        .unwrap();

    // Headers are already committed as a stream; the failure is in-band.
    assert_eq!(response.status(), StatusCode::OK);
    let events = body_events(response).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], StreamEvent::Error(_)));
}

#[tokio::test]
async fn malformed_unit_config_falls_back_to_defaults() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("data: [DONE]\n\n", "text/event-stream"),
        )
        .mount(&mock_server)
        .await;

    let app = create_router(state_with(Some("sk-test"), Some(&mock_server.uri())));
    let response = app
        .oneshot(chat_request(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "unitConfig": {"scaffolding": "not a number"},
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let events = body_events(response).await;
    assert_eq!(events, vec![StreamEvent::Done]);

    let requests = mock_server.received_requests().await.unwrap();
    let provider_body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let system_text = provider_body["messages"][0]["content"].as_str().unwrap();
    // Default document: socratic approach, moderate scaffolding.
    assert!(system_text.contains("Use the Socratic method"));
    assert!(system_text.contains("moderate scaffolding"));
}
