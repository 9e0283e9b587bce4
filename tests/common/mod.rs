#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::{TimeZone, Utc};
use playlog::{
    config::Endpoints,
    error::StoreError,
    storage::{SqliteStore, TrackStore},
    types::{Credentials, PlayedTrackRecord, UserAuth},
};
use serde_json::{Value, json};

/// A request as seen by the stand-in provider.
#[derive(Debug, Clone, Default)]
pub struct SeenRequest {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub params: HashMap<String, String>,
}

pub struct ProviderConfig {
    pub token_status: StatusCode,
    pub token_body: Value,
    pub history_status: StatusCode,
    pub history_body: Value,
    pub profile_status: StatusCode,
    pub profile_body: Value,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token_status: StatusCode::OK,
            token_body: json!({
                "access_token": "access-123",
                "token_type": "Bearer",
                "scope": "user-read-email user-read-recently-played",
                "expires_in": 3600,
                "refresh_token": "refresh-456"
            }),
            history_status: StatusCode::OK,
            history_body: history_page(vec![]),
            profile_status: StatusCode::OK,
            profile_body: json!({
                "id": "listener",
                "display_name": "Listener",
                "email": "listener@example.com",
                "country": "DE",
                "product": "premium",
                "type": "user"
            }),
        }
    }
}

#[derive(Default)]
struct ProviderState {
    token_status: u16,
    token_body: Value,
    history_status: u16,
    history_body: Value,
    profile_status: u16,
    profile_body: Value,
    token_hits: AtomicUsize,
    history_hits: AtomicUsize,
    profile_hits: AtomicUsize,
    last_token: Mutex<Option<SeenRequest>>,
    last_history: Mutex<Option<SeenRequest>>,
    last_profile: Mutex<Option<SeenRequest>>,
}

pub struct MockProvider {
    pub endpoints: Endpoints,
    state: Arc<ProviderState>,
}

impl MockProvider {
    pub fn token_hits(&self) -> usize {
        self.state.token_hits.load(Ordering::SeqCst)
    }

    pub fn history_hits(&self) -> usize {
        self.state.history_hits.load(Ordering::SeqCst)
    }

    pub fn profile_hits(&self) -> usize {
        self.state.profile_hits.load(Ordering::SeqCst)
    }

    pub fn last_profile_request(&self) -> Option<SeenRequest> {
        self.state.last_profile.lock().unwrap().clone()
    }

    pub fn last_token_request(&self) -> Option<SeenRequest> {
        self.state.last_token.lock().unwrap().clone()
    }

    pub fn last_history_request(&self) -> Option<SeenRequest> {
        self.state.last_history.lock().unwrap().clone()
    }
}

fn seen(headers: &HeaderMap, params: HashMap<String, String>) -> SeenRequest {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    SeenRequest {
        authorization: header("authorization"),
        content_type: header("content-type"),
        params,
    }
}

async fn token_handler(
    State(state): State<Arc<ProviderState>>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.token_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_token.lock().unwrap() = Some(seen(&headers, params));
    (
        StatusCode::from_u16(state.token_status).unwrap(),
        Json(state.token_body.clone()),
    )
}

async fn history_handler(
    State(state): State<Arc<ProviderState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.history_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_history.lock().unwrap() = Some(seen(&headers, params));
    (
        StatusCode::from_u16(state.history_status).unwrap(),
        Json(state.history_body.clone()),
    )
}

async fn profile_handler(
    State(state): State<Arc<ProviderState>>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.profile_hits.fetch_add(1, Ordering::SeqCst);
    *state.last_profile.lock().unwrap() = Some(seen(&headers, HashMap::new()));
    (
        StatusCode::from_u16(state.profile_status).unwrap(),
        Json(state.profile_body.clone()),
    )
}

/// Serves the token, profile and history endpoints on an ephemeral local port.
pub async fn spawn_provider(config: ProviderConfig) -> MockProvider {
    let state = Arc::new(ProviderState {
        token_status: config.token_status.as_u16(),
        token_body: config.token_body,
        history_status: config.history_status.as_u16(),
        history_body: config.history_body,
        profile_status: config.profile_status.as_u16(),
        profile_body: config.profile_body,
        ..Default::default()
    });

    let app = Router::new()
        .route("/api/token", post(token_handler))
        .route("/v1/me", get(profile_handler))
        .route("/v1/me/player/recently-played", get(history_handler))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockProvider {
        endpoints: Endpoints::with_base(&format!("http://{addr}")),
        state,
    }
}

/// HTTP client that never routes loopback traffic through a proxy.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

pub fn credentials() -> Credentials {
    Credentials {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        database_url: "sqlite::memory:".to_string(),
    }
}

pub fn user_auth() -> UserAuth {
    UserAuth {
        access_token: "access-123".to_string(),
        refresh_token: "refresh-456".to_string(),
        expires_in: 3600,
        expires_at: Utc::now() + chrono::Duration::seconds(3600),
    }
}

pub fn history_item(track_id: &str, name: &str, played_at: &str, artists: &[&str]) -> Value {
    json!({
        "track": {
            "id": track_id,
            "name": name,
            "artists": artists.iter().map(|a| json!({ "name": a })).collect::<Vec<_>>(),
            "album": { "name": format!("{name} (album)") },
            "popularity": 55,
            "explicit": false,
            "uri": format!("spotify:track:{track_id}")
        },
        "played_at": played_at,
        "context": null
    })
}

pub fn history_page(items: Vec<Value>) -> Value {
    json!({
        "items": items,
        "next": null,
        "cursors": { "after": null, "before": null },
        "limit": 50
    })
}

/// A local file in the feed: no catalog id.
pub fn local_item(name: &str, played_at: &str) -> Value {
    let mut item = history_item("unused", name, played_at, &["Someone"]);
    item["track"]["id"] = Value::Null;
    item["track"]["uri"] = json!(format!("spotify:local:Someone:{name}"));
    item
}

/// A temp directory unique to this process and `name`.
pub fn temp_dir(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("playlog-{name}-{}", std::process::id()))
}

/// The row `history_item` maps to.
pub fn record_for(track_id: &str, name: &str, millis: i64) -> PlayedTrackRecord {
    PlayedTrackRecord {
        timestamp: millis,
        track_id: Some(track_id.to_string()),
        name: name.to_string(),
        artist: "Someone".to_string(),
        album: format!("{name} (album)"),
        played_at: Utc.timestamp_millis_opt(millis).unwrap(),
        popularity: 55,
        explicit: false,
    }
}

pub async fn memory_store() -> SqliteStore {
    SqliteStore::connect("sqlite::memory:").await.unwrap()
}

/// Counts writes reaching the wrapped store.
pub struct CountingStore {
    pub inner: SqliteStore,
    pub inserts: AtomicUsize,
}

impl CountingStore {
    pub fn new(inner: SqliteStore) -> Self {
        Self {
            inner,
            inserts: AtomicUsize::new(0),
        }
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackStore for CountingStore {
    async fn stored_timestamps(&self) -> Result<HashSet<i64>, StoreError> {
        self.inner.stored_timestamps().await
    }

    async fn insert_all(&self, records: &[PlayedTrackRecord]) -> Result<usize, StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_all(records).await
    }
}

/// Simulates another writer landing `intruder` right after the existing
/// timestamps were read.
pub struct RacingStore {
    pub inner: SqliteStore,
    pub intruder: PlayedTrackRecord,
}

#[async_trait]
impl TrackStore for RacingStore {
    async fn stored_timestamps(&self) -> Result<HashSet<i64>, StoreError> {
        let existing = self.inner.stored_timestamps().await?;
        self.inner
            .insert_all(std::slice::from_ref(&self.intruder))
            .await?;
        Ok(existing)
    }

    async fn insert_all(&self, records: &[PlayedTrackRecord]) -> Result<usize, StoreError> {
        self.inner.insert_all(records).await
    }
}
