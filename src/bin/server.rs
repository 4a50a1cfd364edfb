use axum::{Json, Router, http::StatusCode, routing::{get, post}};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use rebar_optimizer::project::Project;
use rebar_optimizer::types::OptimizationResult;

#[derive(Deserialize)]
struct SolveRequest {
    project: Project,
    #[serde(default)]
    seed: Option<u64>,
}

async fn solve(
    Json(req): Json<SolveRequest>,
) -> Result<Json<OptimizationResult>, (StatusCode, String)> {
    let solver = req
        .project
        .solver()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let result = match req.seed {
        Some(seed) => solver.solve_seeded(seed),
        None => solver.solve(),
    }
    .map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    Ok(Json(result))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/solve", post(solve));

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    tracing::info!("listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
