//! Request-level errors and their HTTP mapping.

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::domains::analysis::{MarketDataUnavailable, ValidationError};

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Errors returned by the analysis route, rendered as plain text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Requisição inválida: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("GEMINI_API_KEY não configurada.")]
    ModelNotConfigured,

    #[error(transparent)]
    MarketData(#[from] MarketDataUnavailable),

    #[error("A análise excedeu o tempo limite. Tente novamente.")]
    ModelTimeout,

    #[error("Erro ao gerar a análise.")]
    Model(anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ModelNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MarketData(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::ModelTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::Model(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = ?self, "Analysis request failed");
        } else {
            tracing::info!(status = %status, error = %self, "Analysis request rejected");
        }

        (status, [(CONTENT_TYPE, TEXT_PLAIN_UTF8)], self.to_string()).into_response()
    }
}
