use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{extract::FromRef, routing::get, Router};
use routes::{category_router, questions_router, quizzes_router};
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::error::{self, ApiError};
use super::routes;
use crate::config::ApplicationSettings;
use crate::db::TriviaStore;
use crate::telemetry::render_metrics;

pub type SharedStore = Arc<dyn TriviaStore>;

#[derive(FromRef, Clone)]
pub struct AppState {
    store: SharedStore,
}

impl AppState {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .merge(category_router())
        .merge(questions_router())
        .merge(quizzes_router())
        .method_not_allowed_fallback(error::method_not_allowed)
        .fallback(|| async {
            tracing::info!("Fallback");
            error::not_found().await
        })
        .with_state(state)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(CorsLayer::new().allow_origin(Any))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization, true"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, PATCH, POST, DELETE, OPTIONS"),
        ))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(settings: &ApplicationSettings, store: SharedStore) -> anyhow::Result<()> {
    let addr = settings.address();
    let app = app(AppState::new(store));
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics() -> Result<Response, ApiError> {
    let (content_type, buf) = render_metrics().map_err(|e| ApiError::Internal(e.into()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        Body::from(buf),
    )
        .into_response())
}
