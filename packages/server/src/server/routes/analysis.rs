//! Analysis endpoint.
//!
//! POST /api/analysis[?stream=false]
//!
//! Validates the request, collects market data for the named assets, builds
//! the prompt and returns the model's text as `text/plain`. Streaming is the
//! default; `?stream=false` waits for the whole answer.
//!
//! The model call has its own deadline, separate from the data fetch. In
//! streaming mode a deadline hit before the first byte is a 504; after that
//! the body ends with [`STREAM_TIMEOUT_NOTICE`].

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{rejection::JsonRejection, Extension, Query},
    http::header::{CACHE_CONTROL, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use tokio::time::{timeout_at, Instant};
use tracing::{info, warn};

use crate::domains::analysis::{build_prompt, gather_market_data, validate, AnalysisRequest};
use crate::kernel::{BaseAnalysisModel, TextStream};
use crate::server::app::AppState;
use crate::server::error::{ApiError, TEXT_PLAIN_UTF8};

/// Appended when the model deadline passes mid-stream.
pub const STREAM_TIMEOUT_NOTICE: &str =
    "\n\n[Tempo limite da análise excedido. A resposta pode estar incompleta.]";

/// Appended when the model stream fails mid-way.
pub const STREAM_ERROR_NOTICE: &str =
    "\n\n[Erro ao gerar a análise. A resposta pode estar incompleta.]";

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    #[serde(default = "default_stream")]
    stream: bool,
}

fn default_stream() -> bool {
    true
}

/// Analysis handler.
pub async fn analysis_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<AnalysisQuery>,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let model = state.model.clone().ok_or(ApiError::ModelNotConfigured)?;

    let Json(request) = body.map_err(|e| ApiError::MalformedBody(e.body_text()))?;
    let plan = validate(&request)?;

    info!(
        mode = ?plan.mode,
        analysis_type = ?plan.analysis_type,
        asset = plan.asset.as_deref().unwrap_or("-"),
        stream = query.stream,
        "Analysis requested"
    );

    let snapshots = gather_market_data(&state.extractor, &plan, state.fetch_failure_policy).await?;
    let prompt = build_prompt(&plan, &snapshots);

    let deadline = Instant::now() + state.model_timeout;
    if query.stream {
        stream_response(model, &prompt, deadline).await
    } else {
        whole_response(model, &prompt, deadline).await
    }
}

async fn whole_response(
    model: Arc<dyn BaseAnalysisModel>,
    prompt: &str,
    deadline: Instant,
) -> Result<Response, ApiError> {
    let text = timeout_at(deadline, model.complete(prompt))
        .await
        .map_err(|_| ApiError::ModelTimeout)?
        .map_err(ApiError::Model)?;

    info!(model = model.model_name(), chars = text.chars().count(), "Analysis generated");

    Ok(([(CONTENT_TYPE, TEXT_PLAIN_UTF8)], text).into_response())
}

async fn stream_response(
    model: Arc<dyn BaseAnalysisModel>,
    prompt: &str,
    deadline: Instant,
) -> Result<Response, ApiError> {
    let stream = timeout_at(deadline, model.complete_stream(prompt))
        .await
        .map_err(|_| ApiError::ModelTimeout)?
        .map_err(ApiError::Model)?;

    info!(model = model.model_name(), "Analysis stream started");

    let body = Body::from_stream(bounded_by_deadline(stream, deadline));
    Ok((
        [(CONTENT_TYPE, TEXT_PLAIN_UTF8), (CACHE_CONTROL, "no-cache")],
        body,
    )
        .into_response())
}

/// Forward text deltas until the stream ends, fails, or `deadline` passes.
///
/// Failure and timeout end the stream with a notice instead of an error so
/// the client keeps the text it already received.
pub fn bounded_by_deadline(
    stream: TextStream,
    deadline: Instant,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send {
    stream::unfold(Some(stream), move |state| async move {
        let mut stream = state?;
        match timeout_at(deadline, stream.next()).await {
            Ok(Some(Ok(text))) => Some((Ok(Bytes::from(text)), Some(stream))),
            Ok(Some(Err(e))) => {
                warn!(error = %e, "Model stream failed");
                Some((Ok(Bytes::from_static(STREAM_ERROR_NOTICE.as_bytes())), None))
            }
            Ok(None) => None,
            Err(_) => {
                warn!("Model deadline passed mid-stream");
                Some((Ok(Bytes::from_static(STREAM_TIMEOUT_NOTICE.as_bytes())), None))
            }
        }
    })
}
