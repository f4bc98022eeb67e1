//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use asset_extract::ResilientFetchExtractor;
use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use gemini_client::GeminiClient;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::{Config, FetchFailurePolicy};
use crate::kernel::{BaseAnalysisModel, GeminiModel};
use crate::server::routes::{analysis_handler, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub extractor: ResilientFetchExtractor,
    /// `None` when no model API key is configured; analysis requests then fail with 500.
    pub model: Option<Arc<dyn BaseAnalysisModel>>,
    pub model_timeout: Duration,
    pub fetch_failure_policy: FetchFailurePolicy,
}

impl AppState {
    /// Build the production state: HTTP page source and Gemini model.
    pub fn from_config(config: &Config) -> Result<Self> {
        let extractor = ResilientFetchExtractor::new(config.extractor_config())
            .context("Failed to build market data extractor")?;

        let model = config.gemini_api_key.as_ref().map(|key| {
            let model = GeminiModel::new(GeminiClient::new(key.clone()), config.gemini_model.clone());
            Arc::new(model) as Arc<dyn BaseAnalysisModel>
        });
        if model.is_none() {
            tracing::warn!("GEMINI_API_KEY not set; analysis requests will fail");
        }

        Ok(Self {
            extractor,
            model,
            model_timeout: config.model_timeout,
            fetch_failure_policy: config.fetch_failure_policy,
        })
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    // CORS configuration - allow any origin
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/api/analysis", post(analysis_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
