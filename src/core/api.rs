//! HTTP + WebSocket API for remote readings
//!
//! Endpoints:
//! - POST /session/new - Create new session
//! - GET /session/{id} - Get current output
//! - DELETE /session/{id} - Close session
//! - POST /session/{id}/frame - Deliver one frame
//! - POST /session/{id}/reset - Explicit reset
//! - POST /session/{id}/audio - Collect queued audio commands
//! - WS /ws/{id} - Live updates
//! - GET /health - Health check

use axum::{
    extract::{Path, State, WebSocketUpgrade, ws::{Message, WebSocket}},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::ReadingConfig;
use crate::core::{CommandQueue, ReadingEngine, ReadingSession};
use crate::types::{AudioCommand, Frame, FrameOutput, SoundTrack};

/// Remote session state
#[derive(Debug)]
pub struct ApiSession {
    pub id: String,
    pub session: ReadingSession<CommandQueue>,
    pub update_tx: broadcast::Sender<FrameOutput>,
}

/// App state
pub struct AppState {
    pub sessions: RwLock<HashMap<String, ApiSession>>,
    /// Config for sessions that do not send their own
    pub defaults: ReadingConfig,
    /// Seed phrase for sessions that do not send their own
    pub seed: Option<String>,
}

impl AppState {
    pub fn new(defaults: ReadingConfig, seed: Option<String>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            defaults,
            seed,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ReadingConfig::default(), None)
    }
}

/// Create new session request
#[derive(Debug, Default, Deserialize)]
pub struct NewSessionRequest {
    /// Phrase seeding the aura draw
    pub seed: Option<String>,
    pub config: Option<ReadingConfig>,
}

/// Create new session response
#[derive(Debug, Serialize)]
pub struct NewSessionResponse {
    pub session_id: String,
    pub websocket_url: String,
    pub reveal_threshold_ms: u64,
}

/// One frame from the client; either a flag or full detector output
#[derive(Debug, Deserialize)]
pub struct FrameRequest {
    pub now_ms: u64,
    pub hand_present: Option<bool>,
    pub frame: Option<Frame>,
}

/// Reset response
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub stopped: Option<SoundTrack>,
    pub output: FrameOutput,
}

/// Audio commands queued since the last collection
#[derive(Debug, Serialize)]
pub struct AudioResponse {
    pub commands: Vec<AudioCommand>,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub sessions_active: usize,
}

/// Create the API router with default session settings
pub fn create_router() -> Router {
    router_with_state(Arc::new(AppState::default()))
}

/// Create the API router over existing state
pub fn router_with_state(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/session/new", post(create_session))
        .route("/session/:id", get(get_session).delete(delete_session))
        .route("/session/:id/frame", post(post_frame))
        .route("/session/:id/reset", post(reset_session))
        .route("/session/:id/audio", post(collect_audio))
        .route("/ws/:id", get(websocket_handler))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sessions = state.sessions.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        sessions_active: sessions.len(),
    })
}

/// Create new session
async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewSessionRequest>,
) -> Result<Json<NewSessionResponse>, (StatusCode, String)> {
    let config = req.config.unwrap_or_else(|| state.defaults.clone());
    config.validate().map_err(|e| {
        let status = if e.is_invalid_input() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, e.to_string())
    })?;

    let threshold = config.reveal_threshold_ms;
    let engine = match req.seed.as_deref().or(state.seed.as_deref()) {
        Some(phrase) => ReadingEngine::with_seed_phrase(config, phrase),
        None => ReadingEngine::new(config),
    };
    let session_id = generate_session_id();
    let (tx, _) = broadcast::channel(100);

    let session = ApiSession {
        id: session_id.clone(),
        session: ReadingSession::new(engine, CommandQueue::new()),
        update_tx: tx,
    };

    let mut sessions = state.sessions.write().await;
    sessions.insert(session_id.clone(), session);
    info!("created session {} (threshold {}ms)", session_id, threshold);

    Ok(Json(NewSessionResponse {
        session_id: session_id.clone(),
        websocket_url: format!("/ws/{}", session_id),
        reveal_threshold_ms: threshold,
    }))
}

/// Get session status
async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<FrameOutput>, StatusCode> {
    let sessions = state.sessions.read().await;
    let api = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(api.session.engine().current_output()))
}

/// Close a session; its WebSocket streams end
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    let mut sessions = state.sessions.write().await;
    match sessions.remove(&id) {
        Some(_) => {
            info!("closed session {}", id);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Deliver one frame
async fn post_frame(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<FrameRequest>,
) -> Result<Json<FrameOutput>, (StatusCode, String)> {
    let mut sessions = state.sessions.write().await;
    let api = sessions
        .get_mut(&id)
        .ok_or((StatusCode::NOT_FOUND, format!("no session '{}'", id)))?;

    let output = match (&req.frame, req.hand_present) {
        (Some(frame), _) => api.session.frame(frame, req.now_ms),
        (None, Some(present)) => api.session.tick(present, req.now_ms),
        (None, None) => {
            return Err((
                StatusCode::BAD_REQUEST,
                "either 'frame' or 'hand_present' is required".to_string(),
            ));
        }
    };

    let _ = api.update_tx.send(output.clone());
    Ok(Json(output))
}

/// Explicit reset
async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ResetResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let api = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;

    let output = api.session.reset();
    let _ = api.update_tx.send(output.clone());

    Ok(Json(ResetResponse {
        stopped: output.audio.map(|cmd| cmd.track()),
        output,
    }))
}

/// Hand queued audio commands to the remote player
async fn collect_audio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AudioResponse>, StatusCode> {
    let mut sessions = state.sessions.write().await;
    let api = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let commands = api.session.player_mut().drain();
    debug!("session {}: {} audio commands collected", id, commands.len());
    Ok(Json(AudioResponse { commands }))
}

/// WebSocket handler for live updates
async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ws: Option<WebSocketUpgrade>,
) -> Result<impl IntoResponse, StatusCode> {
    let sessions = state.sessions.read().await;
    let api = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let rx = api.update_tx.subscribe();
    drop(sessions);
    let ws = ws.ok_or(StatusCode::UPGRADE_REQUIRED)?;

    Ok(ws.on_upgrade(move |socket| async move {
        handle_websocket(socket, rx).await;
    }))
}

/// Forward updates until either side goes away
async fn handle_websocket(socket: WebSocket, mut rx: broadcast::Receiver<FrameOutput>) {
    let (mut sender, mut receiver) = socket.split();

    let mut forward = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(update) => {
                    let json = serde_json::to_string(&update).unwrap_or_default();
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("websocket client lagging; skipped {} updates", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let mut listen = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut forward => listen.abort(),
        _ = &mut listen => forward.abort(),
    }
    debug!("websocket closed");
}

/// Generate session ID
fn generate_session_id() -> String {
    format!("session_{:016x}", rand::random::<u64>())
}

/// Run the API server; `defaults` and `seed` apply to sessions that omit them
pub async fn run_server(
    addr: &str,
    defaults: ReadingConfig,
    seed: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("default reveal threshold {}ms", defaults.reveal_threshold_ms);
    let router = router_with_state(Arc::new(AppState::new(defaults, seed)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("✋ Palm Aura API running on {}", addr);
    println!("  POST   /session/new        - Create session");
    println!("  GET    /session/:id        - Get status");
    println!("  DELETE /session/:id        - Close session");
    println!("  POST   /session/:id/frame  - Deliver frame");
    println!("  POST   /session/:id/reset  - Reset reading");
    println!("  POST   /session/:id/audio  - Collect audio commands");
    println!("  WS     /ws/:id             - Live updates");
    println!("  GET    /health             - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
