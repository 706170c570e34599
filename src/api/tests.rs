use super::*;
use crate::core::{ArtisticStyle, AspectRatio, ImageQuality};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STANDARD_PATH: &str = "/models/gemini-2.5-flash-image:generateContent";
const HIGH_TIER_PATH: &str = "/models/gemini-3-pro-image-preview:generateContent";

/// Selector stub that counts how often it is opened
struct CountingSelector {
    key: Mutex<Option<String>>,
    grants: Option<String>,
    opens: AtomicUsize,
}

impl CountingSelector {
    fn new(key: Option<&str>, grants: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            key: Mutex::new(key.map(str::to_string)),
            grants: grants.map(str::to_string),
            opens: AtomicUsize::new(0),
        })
    }

    fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialSelector for CountingSelector {
    async fn has_selected_credential(&self) -> bool {
        self.key.lock().unwrap().is_some()
    }

    async fn open_credential_selector(&self) -> anyhow::Result<()> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(key) = &self.grants {
            *self.key.lock().unwrap() = Some(key.clone());
        }
        Ok(())
    }

    fn selected_credential(&self) -> Option<String> {
        self.key.lock().unwrap().clone()
    }
}

fn client_for(server: &MockServer, key: Option<&str>, selector: Option<Arc<CountingSelector>>) -> GeminiClient {
    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.key = key.map(str::to_string);
    GeminiClient::from_config(&config, selector.map(|s| s as Arc<dyn CredentialSelector>))
}

fn image_response() -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    {"text": "Here is your image"},
                    {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                ]
            },
            "finishReason": "STOP"
        }]
    })
}

fn request_json(settings: &GenerationSettings) -> Value {
    serde_json::to_value(build_request(settings).unwrap()).unwrap()
}

async fn sent_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[test]
fn standard_request_omits_image_size() {
    let settings = GenerationSettings::new("a rickshaw at night")
        .with_style(ArtisticStyle::Cyberpunk)
        .with_lighting(8)
        .with_complexity(9)
        .with_aspect_ratio(AspectRatio::Portrait)
        .with_quality(ImageQuality::Standard);

    let body = request_json(&settings);

    let image_config = &body["generationConfig"]["imageConfig"];
    assert_eq!(image_config["aspectRatio"], "9:16");
    assert!(image_config.get("imageSize").is_none());

    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 1);
    let text = parts[0]["text"].as_str().unwrap();
    for expected in ["Cyberpunk", "8/10", "9/10", "9:16", "Standard", "neon-drenched streets"] {
        assert!(text.contains(expected), "prompt is missing {expected}");
    }
}

#[test]
fn high_tier_request_carries_image_size() {
    for (quality, size) in [(ImageQuality::TwoK, "2K"), (ImageQuality::FourK, "4K")] {
        let body = request_json(&GenerationSettings::new("x").with_quality(quality));
        assert_eq!(body["generationConfig"]["imageConfig"]["imageSize"], size);
    }
}

#[test]
fn source_image_is_the_first_part() {
    let settings = GenerationSettings::new("make it rain")
        .with_source_image("data:image/jpeg;base64,AQIDBA==");

    let body = request_json(&settings);

    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
    assert_eq!(parts[0]["inlineData"]["data"], "AQIDBA==");
    assert!(parts[1]["text"].as_str().unwrap().contains("make it rain"));
}

#[test]
fn corrupt_source_image_is_rejected_before_sending() {
    let settings = GenerationSettings::new("x").with_source_image("data:image/png;base64,###");
    assert!(matches!(
        build_request(&settings),
        Err(StudioError::InvalidSourceImage(_))
    ));
}

#[test]
fn extract_takes_first_inline_part_of_first_candidate() {
    let response: GenerateResponse = serde_json::from_value(json!({
        "candidates": [{
            "content": {"parts": [
                {"text": "thinking"},
                {"inlineData": {"mimeType": "image/jpeg", "data": "Zmlyc3Q="}},
                {"inlineData": {"mimeType": "image/png", "data": "c2Vjb25k"}}
            ]}
        }]
    }))
    .unwrap();

    assert_eq!(extract_image(response).unwrap(), "data:image/jpeg;base64,Zmlyc3Q=");
}

#[test]
fn extract_skips_empty_inline_parts_and_defaults_mime() {
    let response: GenerateResponse = serde_json::from_value(json!({
        "candidates": [{
            "content": {"parts": [
                {"inlineData": {"mimeType": "image/jpeg", "data": ""}},
                {"inlineData": {"data": "c2Vjb25k"}}
            ]}
        }]
    }))
    .unwrap();

    assert_eq!(extract_image(response).unwrap(), "data:image/png;base64,c2Vjb25k");
}

#[test]
fn extract_without_image_fails() {
    let cases = [
        json!({}),
        json!({"candidates": []}),
        json!({"candidates": [{"finishReason": "SAFETY"}]}),
        json!({"candidates": [{"content": {"parts": [{"text": "I cannot draw that"}]}}]}),
        json!({"promptFeedback": {"blockReason": "OTHER"}}),
        // Only the first candidate is scanned
        json!({"candidates": [
            {"content": {"parts": [{"text": "no"}]}},
            {"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AAAA"}}]}}
        ]}),
    ];

    for case in cases {
        let response: GenerateResponse = serde_json::from_value(case.clone()).unwrap();
        assert!(
            matches!(extract_image(response), Err(StudioError::NoImageReturned)),
            "expected no image for {case}"
        );
    }
}

#[test]
fn unknown_parts_are_tolerated() {
    let response: GenerateResponse = serde_json::from_value(json!({
        "candidates": [{"content": {"parts": [
            {"functionCall": {"name": "noop"}},
            {"inline_data": {"mime_type": "image/webp", "data": "AAAA"}}
        ]}}]
    }))
    .unwrap();

    assert_eq!(extract_image(response).unwrap(), "data:image/webp;base64,AAAA");
}

#[tokio::test]
async fn standard_generation_uses_standard_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STANDARD_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response()))
        .expect(1)
        .mount(&server)
        .await;

    let selector = CountingSelector::new(None, Some("paid-key"));
    let client = client_for(&server, Some("test-key"), Some(selector.clone()));

    let url = client.generate(&GenerationSettings::new("a cat")).await.unwrap();

    assert_eq!(url, "data:image/png;base64,iVBORw0KGgo=");
    assert_eq!(selector.opens(), 0);
    let bodies = sent_bodies(&server).await;
    assert!(bodies[0]["generationConfig"]["imageConfig"].get("imageSize").is_none());
}

#[tokio::test]
async fn high_tier_opens_selector_and_uses_selected_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HIGH_TIER_PATH))
        .and(query_param("key", "paid-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response()))
        .expect(1)
        .mount(&server)
        .await;

    let selector = CountingSelector::new(None, Some("paid-key"));
    let client = client_for(&server, Some("test-key"), Some(selector.clone()));
    let settings = GenerationSettings::new("a cat").with_quality(ImageQuality::FourK);

    client.generate(&settings).await.unwrap();

    assert_eq!(selector.opens(), 1);
    let bodies = sent_bodies(&server).await;
    assert_eq!(bodies[0]["generationConfig"]["imageConfig"]["imageSize"], "4K");
}

#[tokio::test]
async fn high_tier_proceeds_when_selection_yields_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HIGH_TIER_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response()))
        .expect(1)
        .mount(&server)
        .await;

    let selector = CountingSelector::new(None, None);
    let client = client_for(&server, Some("test-key"), Some(selector.clone()));
    let settings = GenerationSettings::new("a cat").with_quality(ImageQuality::TwoK);

    client.generate(&settings).await.unwrap();

    assert_eq!(selector.opens(), 1);
}

#[tokio::test]
async fn entity_not_found_reopens_selector_once_without_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HIGH_TIER_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let selector = CountingSelector::new(Some("stale-key"), None);
    let client = client_for(&server, Some("test-key"), Some(selector.clone()));
    let settings = GenerationSettings::new("a cat").with_quality(ImageQuality::TwoK);

    let err = client.generate(&settings).await.unwrap_err();

    assert!(err.is_entity_not_found());
    assert_eq!(err.to_string(), "Requested entity was not found.");
    assert_eq!(selector.opens(), 1);
}

#[tokio::test]
async fn entity_not_found_at_standard_tier_leaves_selector_alone() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STANDARD_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;

    let selector = CountingSelector::new(None, Some("paid-key"));
    let client = client_for(&server, Some("test-key"), Some(selector.clone()));

    let err = client.generate(&GenerationSettings::new("a cat")).await.unwrap_err();

    assert!(err.is_entity_not_found());
    assert_eq!(selector.opens(), 0);
}

#[tokio::test]
async fn non_json_error_body_becomes_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STANDARD_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"), None);

    let err = client.generate(&GenerationSettings::new("a cat")).await.unwrap_err();

    match err {
        StudioError::Api { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_response_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(STANDARD_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("test-key"), None);

    let err = client.generate(&GenerationSettings::new("a cat")).await.unwrap_err();

    assert!(matches!(err, StudioError::NoImageReturned));
}

#[tokio::test]
async fn missing_key_sends_nothing() {
    let server = MockServer::start().await;
    let client = client_for(&server, None, None);

    let err = client.generate(&GenerationSettings::new("a cat")).await.unwrap_err();

    assert!(matches!(err, StudioError::MissingApiKey));
    assert!(sent_bodies(&server).await.is_empty());
}

#[tokio::test]
async fn configured_high_tier_key_is_used_without_a_selector() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HIGH_TIER_PATH))
        .and(query_param("key", "configured-paid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.key = Some("test-key".into());
    config.api.high_tier_key = Some("configured-paid".into());
    let client = GeminiClient::from_config(&config, None);

    let settings = GenerationSettings::new("a cat").with_quality(ImageQuality::FourK);
    assert!(client.generate(&settings).await.is_ok());
}
