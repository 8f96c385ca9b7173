use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use sign_mapping::{FileSource, MappingCache};
use sign_resolver::{CachingResolver, PrefixResolver, SignSequencer};
use tempfile::TempDir;
use tower::util::ServiceExt;

use signseq_server::handlers::{AppState, router};

const MAPPING: &str = r#"{
    "مرحبا": { "path": "signs/hello.mp4", "poster": "posters/hello.jpg" },
    "اهلا وسهلا": { "path": "signs/welcome.mp4" },
    "شكرا": { "path": "signs/thanks.mp4", "syn": ["متشكر"] }
}"#;

fn make_state(disable_cache: bool) -> (AppState, TempDir) {
    let tempdir = tempfile::tempdir().unwrap();
    let mapping_path = tempdir.path().join("mapping.json");
    std::fs::write(&mapping_path, MAPPING).unwrap();
    let assets_dir = tempdir.path().join("public");
    std::fs::create_dir_all(assets_dir.join("signs")).unwrap();
    std::fs::write(assets_dir.join("signs").join("hello.mp4"), b"fake video").unwrap();

    let mappings = Arc::new(MappingCache::new(FileSource::new(&mapping_path)));
    let resolver = CachingResolver::new(PrefixResolver::new("/assets"));
    let state = AppState {
        sequencer: Arc::new(SignSequencer::new(mappings, resolver)),
        max_text_chars: 40,
        disable_cache,
        assets_dir: Some(assets_dir),
    };
    (state, tempdir)
}

async fn get_json(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&body_bytes).unwrap())
}

fn encode(text: &str) -> String {
    let mut out = String::new();
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[tokio::test]
async fn healthz_ok() {
    let (state, _dir) = make_state(false);
    let response = router(state)
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn sequence_endpoint_returns_items() {
    let (state, _dir) = make_state(false);
    let uri = format!("/v1/sequence?text={}", encode("أهلاً وسهلاً بك"));
    let (status, body) = get_json(state, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "أهلاً وسهلاً بك");
    assert_eq!(body["total"], 2);
    assert_eq!(body["matched"], 1);
    assert_eq!(body["missing"], 1);

    let items = body["items"].as_array().unwrap();
    assert_eq!(items[0]["label"], "أهلاً وسهلاً");
    assert_eq!(items[0]["video_url"], "/assets/signs/welcome.mp4");
    assert_eq!(items[0]["playable"], true);
    assert!(items[0]["message"].is_null());
    assert_eq!(items[1]["label"], "بك");
    assert_eq!(items[1]["video_url"], "");
    assert_eq!(items[1]["playable"], false);
    assert!(items[1]["message"].as_str().unwrap().contains("بك"));
}

#[tokio::test]
async fn sequence_endpoint_accepts_json_body() {
    let (state, _dir) = make_state(false);
    let response = router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/sequence")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"text": "مرحبا. متشكر"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "public, max-age=300"
    );
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["poster_url"], "/assets/posters/hello.jpg");
    assert_eq!(items[1]["video_url"], "/assets/signs/thanks.mp4");
    assert_eq!(
        body["preload"],
        serde_json::json!([
            "/assets/signs/hello.mp4",
            "/assets/posters/hello.jpg",
            "/assets/signs/thanks.mp4"
        ])
    );
}

#[tokio::test]
async fn blank_text_yields_an_empty_sequence() {
    for uri in ["/v1/sequence?text=%20%20", "/v1/sequence"] {
        let (state, _dir) = make_state(false);
        let (status, body) = get_json(state, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["total"], 0);
        assert_eq!(body["matched"], 0);
        assert_eq!(body["missing"], 0);
        assert!(body["items"].as_array().unwrap().is_empty());
        assert!(body["preload"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn sequence_endpoint_rejects_oversized_text() {
    let (state, _dir) = make_state(false);
    let uri = format!("/v1/sequence?text={}", encode(&"مرحبا ".repeat(10)));
    let (status, body) = get_json(state, &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("at most 40")
    );
}

#[tokio::test]
async fn examples_endpoint_lists_prompts() {
    let (state, _dir) = make_state(true);
    let response = router(state)
        .oneshot(
            Request::builder()
                .uri("/v1/examples")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(body["examples"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn mapping_status_tracks_lazy_load() {
    let (state, _dir) = make_state(false);
    let (_, body) = get_json(state.clone(), "/v1/mapping").await;
    assert_eq!(body["state"], "uninitialized");
    assert_eq!(body["entries"], 0);

    let (status, _) = get_json(state.clone(), &format!("/v1/sequence?text={}", encode("مرحبا"))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_json(state, "/v1/mapping").await;
    assert_eq!(body["state"], "loaded");
    assert_eq!(body["entries"], 3);
}

#[tokio::test]
async fn assets_are_served_from_disk() {
    let (state, _dir) = make_state(false);
    let response = router(state)
        .oneshot(
            Request::builder()
                .uri("/assets/signs/hello.mp4")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    assert_eq!(&body_bytes[..], b"fake video");
}
