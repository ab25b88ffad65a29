//! HTTP server exposing the article CRUD API.
//!
//! Handlers only talk to an [`ArticleStore`], so the same router serves the
//! JSON-file and SQLite backends.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/` | Welcome message |
//! | `GET`    | `/health` | Health check (returns version and backend) |
//! | `GET`    | `/articles` | List all articles |
//! | `POST`   | `/articles` | Create an article; an empty body loads the seed file instead |
//! | `GET`    | `/articles/{id}` | Fetch one article |
//! | `PUT`    | `/articles/{id}` | Replace an article's title and content |
//! | `DELETE` | `/articles/{id}` | Delete an article |
//! | `GET`    | `/articles/search/{title}` | Case-insensitive title substring search |
//! | `POST`   | `/one-article` | Create an article, returning a confirmation message |
//! | `POST`   | `/add-more-data` | Load the seed file into the store |
//!
//! Collection and action paths also accept a trailing slash. A search with
//! no title fragment, and any unrouted path, is a `404`.
//!
//! # Error Contract
//!
//! Errors are a single-key JSON object:
//!
//! ```json
//! { "error": "Article not found" }
//! ```
//!
//! `400` for bad ids and bodies, `404` for missing articles or a missing seed
//! file, `500` for storage failures (the message carries the underlying
//! error).

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{Article, ArticleInput};
use crate::seed::{self, SeedError};
use crate::store::{open_store, ArticleStore};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// The active storage backend.
    pub store: Arc<dyn ArticleStore>,
    /// Seed file replayed by `POST /add-more-data` and body-less `POST /articles`.
    pub seed_file: Arc<PathBuf>,
}

impl AppState {
    pub fn new(store: Arc<dyn ArticleStore>, seed_file: impl Into<PathBuf>) -> Self {
        Self {
            store,
            seed_file: Arc::new(seed_file.into()),
        }
    }
}

/// Build the router with all routes and middleware attached.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/articles", get(handle_list).post(handle_create))
        .route("/articles/", get(handle_list).post(handle_create))
        .route(
            "/articles/{id}",
            get(handle_get).put(handle_update).delete(handle_delete),
        )
        .route("/articles/search", get(handle_search_without_title))
        .route("/articles/search/", get(handle_search_without_title))
        .route("/articles/search/{title}", get(handle_search))
        .route("/one-article", post(handle_create_one))
        .route("/one-article/", post(handle_create_one))
        .route("/add-more-data", post(handle_add_more_data))
        .route("/add-more-data/", post(handle_add_more_data))
        .fallback(handle_fallback)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Starts the HTTP server.
///
/// Opens the configured backend, binds `[server].bind`, and serves until
/// Ctrl-C or SIGTERM. In-flight requests are allowed to finish, then the
/// backend is closed (draining the connection pool for the database
/// backend).
///
/// # Errors
///
/// Fails before accepting any request if the backend cannot be opened
/// (missing `DATABASE_URL`, unreachable database, unreadable data file) or
/// the address cannot be bound.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = open_store(config).await?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;

    tracing::info!(
        backend = store.backend_name(),
        "Articles API listening on http://{}",
        listener.local_addr()?
    );

    let state = AppState::new(store.clone(), config.store.seed_file.clone());
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down, closing {} backend", store.backend_name());
    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// ============ Error response ============

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: message.into(),
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        if err.is_not_found() {
            return not_found(err.to_string());
        }
        tracing::error!("storage failure: {}", err);
        internal(err.to_string())
    }
}

impl From<SeedError> for AppError {
    fn from(err: SeedError) -> Self {
        match err {
            SeedError::Missing(path) => {
                not_found(format!("seed file not found: {}", path.display()))
            }
            SeedError::Store(e) => e.into(),
            other => {
                tracing::error!("bulk load failed: {}", other);
                internal(other.to_string())
            }
        }
    }
}

// ============ Request parsing ============

/// Body as received, before the presence check.
#[derive(Deserialize)]
struct ArticlePayload {
    title: Option<String>,
    content: Option<String>,
}

fn parse_article(body: &[u8]) -> Result<ArticleInput, AppError> {
    let payload: ArticlePayload = serde_json::from_slice(body)
        .map_err(|e| bad_request(format!("Invalid request body: {}", e)))?;
    match (payload.title, payload.content) {
        (Some(title), Some(content)) => Ok(ArticleInput { title, content }),
        _ => Err(bad_request("Title and content are required")),
    }
}

fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| bad_request(format!("Invalid article id: {}", raw)))
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(|b| b.is_ascii_whitespace())
}

// ============ Handlers ============

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.to_string(),
    })
}

#[derive(Serialize)]
struct LoadResponse {
    message: String,
    inserted: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    backend: String,
}

async fn handle_root() -> Json<MessageResponse> {
    message("Welcome to the Articles API")
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store.backend_name().to_string(),
    })
}

async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(state.store.list().await?))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Article>, AppError> {
    let id = parse_id(&id)?;
    Ok(Json(state.store.get(id).await?))
}

/// `POST /articles`: with a body, creates one article and echoes it back;
/// with an empty body, replays the seed file.
async fn handle_create(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    if is_blank(&body) {
        let inserted = seed::load_seed_file(state.store.as_ref(), &state.seed_file).await?;
        let resp = LoadResponse {
            message: "Articles loaded successfully".to_string(),
            inserted,
        };
        return Ok((StatusCode::CREATED, Json(resp)).into_response());
    }

    let input = parse_article(&body)?;
    let created = state.store.insert(&input).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

async fn handle_create_one(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let input = parse_article(&body)?;
    state.store.insert(&input).await?;
    Ok((StatusCode::CREATED, message("Article created successfully")))
}

async fn handle_add_more_data(
    State(state): State<AppState>,
) -> Result<Json<LoadResponse>, AppError> {
    let inserted = seed::load_seed_file(state.store.as_ref(), &state.seed_file).await?;
    Ok(Json(LoadResponse {
        message: "Articles added successfully".to_string(),
        inserted,
    }))
}

async fn handle_search(
    State(state): State<AppState>,
    Path(title): Path<String>,
) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(state.store.search_by_title(&title).await?))
}

async fn handle_search_without_title() -> AppError {
    not_found("Search term is required")
}

async fn handle_fallback() -> AppError {
    not_found("Not found")
}

async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    let input = parse_article(&body)?;
    state.store.update(id, &input).await?;
    Ok(message("Article updated successfully"))
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;
    state.store.delete(id).await?;
    Ok(message("Article deleted successfully"))
}
