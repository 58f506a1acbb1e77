use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use serde_json::{json, Value};

use assessdb_cli::api::{RecommendRequest, RecommendResponse};
use assessdb_engine::Recommender;

#[derive(Parser, Debug)]
#[command(name = "assessdb-server", about = "HTTP API serving assessment recommendations")]
struct ServerCli {
    /// Interface to bind. Defaults to `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind. Defaults to `server.port`.
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[derive(Clone)]
struct AppState {
    recommender: Arc<Recommender>,
}

#[tokio::main]
async fn main() -> Result<()> {
    assessdb_cli::init_tracing();
    let cli = ServerCli::parse();
    let settings = assessdb_cli::load_settings()?;

    let host = cli.host.unwrap_or_else(|| settings.server.host.clone());
    let port = cli.port.unwrap_or(settings.server.port);

    // Model loading and the blocking HTTP client stay off the async workers.
    let recommender = tokio::task::spawn_blocking(move || Recommender::from_settings(&settings))
        .await
        .context("failed to initialise the recommender")?;
    let state = AppState { recommender: Arc::new(recommender) };

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/recommend", post(recommend))
        .with_state(state);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))?;
    tracing::info!(%addr, "assessdb-server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server shutdown")?;
    Ok(())
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "assessdb recommendation service is running" }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn recommend(State(state): State<AppState>, Json(request): Json<RecommendRequest>) -> Json<RecommendResponse> {
    tracing::info!(query = %request.query, "received query");
    let options = request.options(state.recommender.default_top_k());
    let query = request.query;
    let recommender = Arc::clone(&state.recommender);
    let task_query = query.clone();
    let outcome = tokio::task::spawn_blocking(move || recommender.search(&task_query, options)).await;
    match outcome {
        Ok(response) => Json(response.into()),
        Err(err) => {
            tracing::error!(error = %err, "search task failed");
            Json(RecommendResponse::failure(query, format!("Search failed: {err}")))
        }
    }
}
