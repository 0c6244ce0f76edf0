//! HTTP API tests against the in-memory registry and a scripted vision backend.

use std::sync::Arc;

use base64::Engine;
use reqwest::StatusCode;
use serde_json::{json, Value};

use assetry_api::{router, AppState, ServerConfig};
use assetry_db::{in_memory_registry, InMemoryMediaIndex};
use assetry_inference::mock::MockVisionBackend;
use assetry_inference::{
    InferenceConfig, MediaSourceConfig, MediaSourceFetcher, SuggestionOrchestrator,
};
use uuid::Uuid;

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    index: InMemoryMediaIndex,
    backend: MockVisionBackend,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create_media_type(&self, body: Value) -> Value {
        let resp = self
            .client
            .post(self.url("/api/v1/media-types"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }
}

async fn spawn_server(backend: MockVisionBackend, api_key: Option<&str>) -> TestServer {
    let (registry, index) = in_memory_registry();
    let inference = InferenceConfig {
        api_key: api_key.map(str::to_string),
        model: "vision-test".to_string(),
        ..Default::default()
    };
    let orchestrator = SuggestionOrchestrator::new(Arc::new(backend.clone()), &inference);
    let fetcher = MediaSourceFetcher::new(&MediaSourceConfig {
        allowed_hosts: vec!["cdn.example.com".to_string()],
        ..Default::default()
    })
    .unwrap();

    let state = AppState {
        registry,
        orchestrator,
        fetcher,
    };
    let app = router(state, &ServerConfig::default());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        index,
        backend,
    }
}

fn photo_type() -> Value {
    json!({
        "name": "Product Photo",
        "color": "#f59e0b",
        "allowed_formats": ["JPG", ".png"],
        "fields": [
            {"name": "sku", "label": "SKU", "type": "text", "required": true},
            {"name": "finish", "label": "Finish", "type": "select", "options": ["matte", "gloss"]}
        ],
        "default_tags": ["Catalog"],
        "dimension_constraint": {
            "enabled": true,
            "aspect_ratio": {"label": "16:9", "value": 1.7777777777777777},
            "min_width": 1920,
            "min_height": 10
        }
    })
}

fn encoded_png() -> String {
    let bytes = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

// =============================================================================
// MEDIA TYPES
// =============================================================================

#[tokio::test]
async fn test_health() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;
    let body: Value = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_media_type_crud() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;

    let created = server.create_media_type(photo_type()).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["allowed_formats"], json!(["jpg", "png"]));
    assert_eq!(created["dimension_constraint"]["min_height"], 1080);

    let fetched: Value = server
        .client
        .get(server.url(&format!("/api/v1/media-types/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);

    let resp = server
        .client
        .patch(server.url(&format!("/api/v1/media-types/{}", id)))
        .json(&json!({"description": "Storefront imagery"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["description"], "Storefront imagery");
    assert_eq!(updated["name"], "Product Photo");

    let listed: Vec<Value> = server
        .client
        .get(server.url("/api/v1/media-types"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let resp = server
        .client
        .delete(server.url(&format!("/api/v1/media-types/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = server
        .client
        .get(server.url(&format!("/api/v1/media-types/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_null_removes_dimension_constraint() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;
    let created = server.create_media_type(photo_type()).await;
    let url = server.url(&format!("/api/v1/media-types/{}", created["id"].as_str().unwrap()));

    let updated: Value = server
        .client
        .patch(&url)
        .json(&json!({"color": "#123"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["dimension_constraint"], created["dimension_constraint"]);

    let resp = server
        .client
        .patch(&url)
        .json(&json!({"dimension_constraint": null}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert!(updated.get("dimension_constraint").is_none());
    assert_eq!(updated["color"], "#123");
}

#[tokio::test]
async fn test_schema_violations_return_field() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;
    server.create_media_type(photo_type()).await;

    let cases = [
        (json!({"name": "product photo", "allowed_formats": ["jpg"]}), "name"),
        (json!({"name": "Banner", "allowed_formats": []}), "allowed_formats"),
        (
            json!({"name": "Banner", "color": "teal", "allowed_formats": ["jpg"]}),
            "color",
        ),
    ];
    for (body, field) in cases {
        let resp = server
            .client
            .post(server.url("/api/v1/media-types"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", body);
        let err: Value = resp.json().await.unwrap();
        assert_eq!(err["field"], field, "{}", body);
        assert!(err["error"].as_str().is_some());
    }

    let listed: Vec<Value> = server
        .client
        .get(server.url("/api/v1/media-types"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_delete_refused_while_referenced() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;
    let created = server.create_media_type(photo_type()).await;
    let id: Uuid = created["id"].as_str().unwrap().parse().unwrap();
    let media_id = server.index.attach(id).await;

    let url = server.url(&format!("/api/v1/media-types/{}", id));
    let resp = server.client.delete(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let err: Value = resp.json().await.unwrap();
    assert!(err["error"].as_str().unwrap().contains("still referenced"));

    assert!(server.index.detach(media_id).await);
    let resp = server.client.delete(&url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_validate_metadata() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;
    let created = server.create_media_type(photo_type()).await;
    let url = server.url(&format!(
        "/api/v1/media-types/{}/validate-metadata",
        created["id"].as_str().unwrap()
    ));

    let resp = server
        .client
        .post(&url)
        .json(&json!({"metadata": {"sku": "A-100", "finish": "matte"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["valid"], true);

    let resp = server
        .client
        .post(&url)
        .json(&json!({"metadata": {"sku": "A-100", "finish": "satin"}}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    assert!(err["field"].as_str().unwrap().contains("finish"));
}

// =============================================================================
// DIMENSIONS
// =============================================================================

#[tokio::test]
async fn test_dimension_link() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;

    let presets: Vec<Value> = server
        .client
        .get(server.url("/api/v1/aspect-ratios"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(presets[0]["label"], "None");
    assert!(presets.iter().any(|p| p["label"] == "16:9"));

    let body: Value = server
        .client
        .post(server.url("/api/v1/dimensions/link"))
        .json(&json!({
            "edited": "height",
            "height": 1080,
            "width": null,
            "aspect_ratio": {"label": "4:3", "value": 1.3333333333333333}
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"width": 1440, "height": 1080, "linked": true}));

    let body: Value = server
        .client
        .post(server.url("/api/v1/dimensions/link"))
        .json(&json!({
            "edited": "width",
            "width": "abc",
            "height": 720,
            "aspect_ratio": {"label": "16:9", "value": 1.7777777777777777}
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["width"], Value::Null);
    assert_eq!(body["height"], 720);
}

// =============================================================================
// SUGGESTIONS
// =============================================================================

#[tokio::test]
async fn test_suggestion_merges_media_type_context() {
    let backend = MockVisionBackend::new().with_reply(
        r#"{"title":"Walnut desk lamp","description":"A lamp on a desk.","altText":"Brass lamp on a walnut desk","tags":["Lamp","catalog","interior"]}"#,
    );
    let server = spawn_server(backend, Some("k")).await;
    let created = server.create_media_type(photo_type()).await;

    let resp = server
        .client
        .post(server.url("/api/v1/suggestions"))
        .json(&json!({
            "data": encoded_png(),
            "mime_type": "image/png",
            "filename": "lamp.png",
            "media_type_id": created["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();

    assert_eq!(body["suggestion"]["title"], "Walnut desk lamp");
    assert_eq!(
        body["suggestion"]["tags"],
        json!(["catalog", "lamp", "interior"])
    );
    assert_eq!(body["source"]["kind"], "inference");
    assert_eq!(body["source"]["model"], "vision-test");

    let calls = server.backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].prompt.contains("Product Photo"));
    assert_eq!(calls[0].mime_type, "image/png");
}

#[tokio::test]
async fn test_suggestion_fallback_for_unsupported_media() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;

    let body: Value = server
        .client
        .post(server.url("/api/v1/suggestions"))
        .json(&json!({
            "data": base64::engine::general_purpose::STANDARD.encode(b"%PDF-1.7"),
            "mime_type": "application/pdf",
            "filename": "annual_report-2025.pdf",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["suggestion"]["title"], "Annual Report 2025");
    assert_eq!(body["source"]["kind"], "fallback");
    assert_eq!(body["source"]["reason"], "unsupported_media");
    assert_eq!(server.backend.call_count(), 0);
}

#[tokio::test]
async fn test_suggestion_quota_error_is_429() {
    let backend = MockVisionBackend::new().with_failure("429 quota exceeded for project");
    let server = spawn_server(backend, Some("k")).await;

    let resp = server
        .client
        .post(server.url("/api/v1/suggestions"))
        .json(&json!({"data": encoded_png(), "mime_type": "image/png", "filename": "a.png"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let err: Value = resp.json().await.unwrap();
    let message = err["error"].as_str().unwrap();
    assert!(message.contains("quota"));
    assert!(!message.contains("project"));
}

#[tokio::test]
async fn test_suggestion_without_api_key_is_503() {
    let server = spawn_server(MockVisionBackend::new(), None).await;

    let resp = server
        .client
        .post(server.url("/api/v1/suggestions"))
        .json(&json!({"data": encoded_png(), "mime_type": "image/png", "filename": "a.png"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(server.backend.call_count(), 0);
}

#[tokio::test]
async fn test_suggestion_rejects_bad_payloads() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;

    let resp = server
        .client
        .post(server.url("/api/v1/suggestions"))
        .json(&json!({"data": "not base64!!", "filename": "a.png"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .client
        .post(server.url("/api/v1/suggestions"))
        .json(&json!({
            "data": encoded_png(),
            "filename": "a.png",
            "media_type_id": Uuid::new_v4(),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_suggestion_refuses_formats_outside_media_type() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;
    let created = server.create_media_type(photo_type()).await;

    let resp = server
        .client
        .post(server.url("/api/v1/suggestions"))
        .json(&json!({
            "data": encoded_png(),
            "mime_type": "image/gif",
            "filename": "spinner.gif",
            "media_type_id": created["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["field"], "filename");

    // Refused before the trusted host is ever contacted.
    let resp = server
        .client
        .post(server.url("/api/v1/suggestions/from-url"))
        .json(&json!({
            "url": "https://cdn.example.com/press/brochure.pdf",
            "media_type_id": created["id"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let err: Value = resp.json().await.unwrap();
    assert_eq!(err["field"], "filename");

    assert_eq!(server.backend.call_count(), 0);
}

#[tokio::test]
async fn test_suggestion_from_untrusted_url_is_403() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;

    for url in [
        "https://evil.example.net/a.jpg",
        "http://cdn.example.com/a.jpg",
        "https://cdn.example.com.evil.net/a.jpg",
    ] {
        let resp = server
            .client
            .post(server.url("/api/v1/suggestions/from-url"))
            .json(&json!({"url": url}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{}", url);
    }
    assert_eq!(server.backend.call_count(), 0);
}

#[tokio::test]
async fn test_openapi_document_served() {
    let server = spawn_server(MockVisionBackend::new(), Some("k")).await;
    let doc: Value = server
        .client
        .get(server.url("/api-docs/openapi.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(doc["paths"]["/api/v1/suggestions"].is_object());
}
