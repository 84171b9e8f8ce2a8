use crate::config::{AppConfig, GeometryConfig, ServiceMode};
use crate::error::ServiceError;
use crate::pipeline::{self, CalculateResponse, ConcaveHullResponse, OptimalPointResponse};
use anyhow::{Context, Result};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub geometry: GeometryConfig,
    pub mode: ServiceMode,
}

#[derive(Deserialize)]
pub struct CoordsQuery {
    coords: Option<String>,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    mode: &'static str,
}

type HandlerResult<T> = Result<Json<T>, ServiceError>;

/// Routes for the configured mode. Only one variant is mounted at a time.
pub fn build_router(config: &AppConfig) -> Router {
    let state = Arc::new(AppState {
        geometry: config.geometry.clone(),
        mode: config.server.mode,
    });

    let routes = match config.server.mode {
        ServiceMode::Combined => Router::new().route("/calculate", get(calculate_handler)),
        ServiceMode::Split => Router::new()
            .route("/concave-hull", get(concave_hull_handler))
            .route("/optimal-point", get(optimal_point_handler)),
    };

    routes
        .route("/health", get(health_handler))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let app = build_router(&config);

    let host = config.server.host.as_str();
    let port = config.server.port;
    let listener = tokio::net::TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::info!(
        mode = config.server.mode.as_str(),
        "Starting server on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

fn coords_param(query: Result<Query<CoordsQuery>, QueryRejection>) -> Result<Option<String>, ServiceError> {
    match query {
        Ok(Query(q)) => Ok(q.coords),
        Err(rejection) => Err(ServiceError::MalformedJson(rejection.body_text())),
    }
}

/// Geometry is CPU-bound; keep it off the async workers.
async fn run_blocking<T, F>(job: F) -> Result<T, ServiceError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
{
    tokio::task::spawn_blocking(job).await?
}

async fn calculate_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CoordsQuery>, QueryRejection>,
) -> HandlerResult<CalculateResponse> {
    let coords = coords_param(query)?;
    let settings = state.geometry.clone();
    let response = run_blocking(move || pipeline::calculate(coords.as_deref(), &settings)).await?;
    Ok(Json(response))
}

async fn concave_hull_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CoordsQuery>, QueryRejection>,
) -> HandlerResult<ConcaveHullResponse> {
    let coords = coords_param(query)?;
    let settings = state.geometry.clone();
    let response = run_blocking(move || pipeline::concave_hull_only(coords.as_deref(), &settings)).await?;
    Ok(Json(response))
}

async fn optimal_point_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CoordsQuery>, QueryRejection>,
) -> HandlerResult<OptimalPointResponse> {
    let coords = coords_param(query)?;
    let settings = state.geometry.clone();
    let response = run_blocking(move || pipeline::optimal_point_only(coords.as_deref(), &settings)).await?;
    Ok(Json(response))
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        mode: state.mode.as_str(),
    })
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ServiceError::Unexpected(detail).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_router_creation() {
        let mut config = AppConfig::default();
        let _combined = build_router(&config);
        config.server.mode = ServiceMode::Split;
        let _split = build_router(&config);
    }

    #[test]
    fn test_panic_becomes_internal_error() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
