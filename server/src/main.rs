//! HTTP driver for the connect4 engine.
//!
//! Settings come from the TOML file named by `CONNECT4_CONFIG`, or the
//! defaults when it is unset; `config.example.toml` lists every key.
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use connect4::{best_move, board_status, Difficulty, GameError, MoveRequest, Piece};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

mod config;

use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    init_tracing(&config.log_filter);
    let addr = config.socket_addr()?;
    let app = app_router(config);

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(filter: &str) {
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn app_router(config: ServerConfig) -> Router {
    let api = Router::new()
        .route("/move", get(handle_move))
        .route("/status", get(handle_status))
        .with_state(Arc::new(config));
    Router::new()
        .nest("/api", api)
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET])
                .allow_origin(axum::http::HeaderValue::from_static("*"))
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, serde::Deserialize)]
struct MoveQuery {
    #[serde(default)]
    position: String,
    difficulty: Option<Difficulty>,
    depth: Option<u8>,
    to_move: Option<Piece>,
}

#[derive(Debug, serde::Deserialize)]
struct StatusQuery {
    #[serde(default)]
    position: String,
}

async fn handle_move(
    State(config): State<Arc<ServerConfig>>,
    Query(query): Query<MoveQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let depth = query
        .depth
        .unwrap_or_else(|| query.difficulty.unwrap_or(config.default_difficulty).depth());
    if depth == 0 || depth > config.max_depth {
        return Err(GameError::DepthOutOfRange(depth).into());
    }
    let req = MoveRequest {
        position: query.position,
        depth,
        to_move: query.to_move,
    };
    debug!(position = %req.position, depth, "move requested");
    // The search is CPU-bound; keep it off the async workers.
    let mv = tokio::task::spawn_blocking(move || best_move(req)).await??;
    let headers = [(header::CACHE_CONTROL, "no-store")];
    Ok((headers, Json(mv)))
}

async fn handle_status(Query(query): Query<StatusQuery>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(board_status(&query.position)?))
}

#[derive(Debug)]
struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let body = format!("{}", self.0);
        (status, body).into_response()
    }
}
