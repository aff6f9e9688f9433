//! HTTP server for the single-page assistant.
//!
//! Serves the chat page at `/` and a JSON API behind it. Every request is
//! one interaction pass: the knowledge base is re-read from disk, at most
//! one mutation is applied, and the response carries any notices the pass
//! produced.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Chat page with the admin panel toggle |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/info` | Title, greeting, input placeholder |
//! | `POST` | `/api/sessions` | Start a conversation session |
//! | `GET`  | `/api/sessions/{id}` | Session transcript |
//! | `DELETE` | `/api/sessions/{id}` | End a session |
//! | `POST` | `/api/sessions/{id}/messages` | Ask a question |
//! | `GET`  | `/api/faqs` | List the knowledge base |
//! | `POST` | `/api/faqs` | Add a record |
//! | `DELETE` | `/api/faqs/{index}` | Delete the record at a 0-based position |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//! Malformed request bodies and path segments use the same shape.
//!
//! The admin endpoints are not authenticated. The page only hides the panel
//! behind an opt-in checkbox.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::admin::{self, AdminError};
use crate::assistant::{answer, Exchange};
use crate::config::Config;
use crate::models::{FaqRecord, Notice};
use crate::session::{Session, SessionRegistry};
use crate::store::KnowledgeStore;

const INDEX_HTML: &str = include_str!("page.html");

/// Longest query accepted by `POST /api/sessions/{id}/messages`, in characters.
pub const MAX_QUERY_CHARS: usize = 1000;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<KnowledgeStore>,
    sessions: Arc<Mutex<SessionRegistry>>,
}

impl AppState {
    fn sessions(&self) -> Result<MutexGuard<'_, SessionRegistry>, AppError> {
        self.sessions
            .lock()
            .map_err(|_| internal("session registry lock poisoned"))
    }
}

/// Build the router without binding. Used by [`run_server`] and tests.
pub fn router(config: &Config) -> Router {
    let state = AppState {
        store: Arc::new(KnowledgeStore::new(&config.store.path)),
        config: Arc::new(config.clone()),
        sessions: Arc::new(Mutex::new(SessionRegistry::new())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/info", get(handle_info))
        .route("/api/sessions", post(handle_start_session))
        .route(
            "/api/sessions/{id}",
            get(handle_get_session).delete(handle_end_session),
        )
        .route("/api/sessions/{id}/messages", post(handle_message))
        .route("/api/faqs", get(handle_list_faqs).post(handle_add_faq))
        .route("/api/faqs/{index}", delete(handle_delete_faq))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let app = router(config);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;

    tracing::info!(
        bind = %config.server.bind,
        store = %config.store.path.display(),
        "server started"
    );
    println!("Hriday Mitra listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<AdminError> for AppError {
    fn from(err: AdminError) -> Self {
        bad_request(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

/// Run blocking store work off the async worker threads.
async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| internal(format!("worker task failed: {}", e)))
}

fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| not_found(format!("no session with id: {}", raw)))
}

// ============ Page and metadata ============

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct InfoResponse {
    title: String,
    greeting: String,
    input_placeholder: String,
}

async fn handle_info(State(state): State<AppState>) -> Json<InfoResponse> {
    let a = &state.config.assistant;
    Json(InfoResponse {
        title: a.title.clone(),
        greeting: a.greeting.clone(),
        input_placeholder: a.input_placeholder.clone(),
    })
}

// ============ Sessions ============

async fn handle_start_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let mut sessions = state.sessions()?;
    let id = sessions.start();
    let session = sessions
        .get(&id)
        .cloned()
        .ok_or_else(|| internal("session vanished after creation"))?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    let id = parse_session_id(&id)?;
    let sessions = state.sessions()?;
    let session = sessions
        .get(&id)
        .cloned()
        .ok_or_else(|| not_found(format!("no session with id: {}", id)))?;
    Ok(Json(session))
}

async fn handle_end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_session_id(&id)?;
    if state.sessions()?.end(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(format!("no session with id: {}", id)))
    }
}

#[derive(Deserialize)]
struct MessageRequest {
    query: String,
}

async fn handle_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Result<Json<Exchange>, AppError> {
    let id = parse_session_id(&id)?;
    let Json(req) = payload?;
    let query = req.query.trim().to_string();
    if query.is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(bad_request(format!(
            "query must be at most {} characters",
            MAX_QUERY_CHARS
        )));
    }
    let known = state.sessions()?.get(&id).is_some();
    if !known {
        return Err(not_found(format!("no session with id: {}", id)));
    }

    let store = Arc::clone(&state.store);
    let config = Arc::clone(&state.config);
    let pending = blocking(move || answer(&store, &config.assistant, &query)).await?;

    // The session may have ended while the answer was computed.
    let mut sessions = state.sessions()?;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| not_found(format!("no session with id: {}", id)))?;
    let exchange = pending.record(session);

    tracing::info!(session = %id, matched = exchange.matched, score = exchange.score, "answered query");
    Ok(Json(exchange))
}

// ============ Admin ============

#[derive(Serialize)]
struct FaqListResponse {
    faqs: Vec<FaqRecord>,
    notices: Vec<Notice>,
}

async fn handle_list_faqs(
    State(state): State<AppState>,
) -> Result<Json<FaqListResponse>, AppError> {
    let store = Arc::clone(&state.store);
    let (faqs, notices) = blocking(move || admin::list_records(&store)).await?;
    Ok(Json(FaqListResponse { faqs, notices }))
}

#[derive(Deserialize)]
struct AddFaqRequest {
    question: String,
    answer: String,
}

async fn handle_add_faq(
    State(state): State<AppState>,
    payload: Result<Json<AddFaqRequest>, JsonRejection>,
) -> Result<Json<FaqListResponse>, AppError> {
    let Json(req) = payload?;
    let store = Arc::clone(&state.store);
    let outcome =
        blocking(move || admin::add_record(&store, &req.question, &req.answer)).await??;
    Ok(Json(FaqListResponse {
        faqs: outcome.records,
        notices: outcome.notices,
    }))
}

#[derive(Serialize)]
struct NoticesResponse {
    notices: Vec<Notice>,
}

/// The deleted list is not returned; the client must reload it.
async fn handle_delete_faq(
    State(state): State<AppState>,
    index: Result<Path<usize>, PathRejection>,
) -> Result<Json<NoticesResponse>, AppError> {
    let Path(index) = index?;
    let store = Arc::clone(&state.store);
    let outcome = blocking(move || admin::delete_record(&store, index)).await??;
    Ok(Json(NoticesResponse {
        notices: outcome.notices,
    }))
}
