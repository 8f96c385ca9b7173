use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sign_mapping::FileSource;
use sign_resolver::{
    CachingResolver, PrefixResolver, SignSequencer, asset_paths, example_sentences,
};
use sign_types::SequenceItem;
use thiserror::Error;
use tower_http::services::ServeDir;

pub type Sequencer = SignSequencer<FileSource, CachingResolver<PrefixResolver>>;

#[derive(Clone)]
pub struct AppState {
    pub sequencer: Arc<Sequencer>,
    pub max_text_chars: usize,
    pub disable_cache: bool,
    pub assets_dir: Option<PathBuf>,
}

#[derive(Deserialize)]
pub struct SequenceQuery {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct SequenceRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct SequenceResponse {
    text: String,
    total: usize,
    matched: usize,
    missing: usize,
    items: Vec<ItemResponse>,
    preload: Vec<String>,
}

#[derive(Serialize)]
struct ItemResponse {
    label: String,
    video_url: String,
    poster_url: Option<String>,
    original_text: String,
    playable: bool,
    message: Option<String>,
}

impl From<SequenceItem> for ItemResponse {
    fn from(item: SequenceItem) -> Self {
        let playable = item.is_playable();
        let message = item.missing_sign_message();
        Self {
            label: item.label,
            video_url: item.video_url,
            poster_url: item.poster_url,
            original_text: item.original_text,
            playable,
            message,
        }
    }
}

#[derive(Serialize)]
struct ExamplesResponse {
    examples: Vec<&'static str>,
}

#[derive(Serialize)]
struct MappingStatusResponse {
    state: &'static str,
    entries: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    let assets_dir = state.assets_dir.clone();
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/sequence", get(sequence_query).post(sequence_body))
        .route("/v1/examples", get(examples))
        .route("/v1/mapping", get(mapping_status))
        .with_state(state);

    match assets_dir {
        Some(dir) => router.nest_service("/assets", ServeDir::new(dir)),
        None => router,
    }
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn sequence_query(
    State(state): State<AppState>,
    Query(params): Query<SequenceQuery>,
) -> Result<Response, ApiError> {
    let text = params.text.unwrap_or_default();
    build_response(&state, text).await
}

async fn sequence_body(
    State(state): State<AppState>,
    Json(request): Json<SequenceRequest>,
) -> Result<Response, ApiError> {
    build_response(&state, request.text).await
}

async fn build_response(state: &AppState, text: String) -> Result<Response, ApiError> {
    if text.chars().count() > state.max_text_chars {
        return Err(ApiError::bad_request(format!(
            "text must be at most {} characters",
            state.max_text_chars
        )));
    }

    let items = state.sequencer.build_sequence(&text).await;
    let matched = items.iter().filter(|item| item.is_playable()).count();
    let preload = asset_paths(&items);
    let response = SequenceResponse {
        text,
        total: items.len(),
        matched,
        missing: items.len() - matched,
        items: items.into_iter().map(ItemResponse::from).collect(),
        preload,
    };

    Ok(cacheable(state, "public, max-age=300", Json(response)))
}

async fn examples(State(state): State<AppState>) -> Response {
    let body = Json(ExamplesResponse {
        examples: example_sentences().to_vec(),
    });
    cacheable(&state, "public, max-age=3600", body)
}

async fn mapping_status(State(state): State<AppState>) -> Json<MappingStatusResponse> {
    let cache = state.sequencer.mappings();
    Json(MappingStatusResponse {
        state: cache.state().as_str(),
        entries: cache.get().map_or(0, |mapping| mapping.len()),
    })
}

fn cacheable(state: &AppState, policy: &'static str, body: impl IntoResponse) -> Response {
    if state.disable_cache {
        return body.into_response();
    }
    (
        [(header::CACHE_CONTROL, HeaderValue::from_static(policy))],
        body,
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
