use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{debug, error};

use crate::classifier::ClassifyError;
use crate::gateway::payload::Envelope;
use crate::inference::InferenceError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error(transparent)]
    InferenceFailure(#[from] ClassifyError),
}

impl GatewayError {
    /// Classification task ended without a result (panic or cancellation).
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::InferenceFailure(ClassifyError::InferenceFailure(InferenceError::Aborted {
            reason: reason.into(),
        }))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::InferenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            GatewayError::MalformedRequest(reason) => debug!(%reason, "Rejected request"),
            GatewayError::InferenceFailure(cause) => error!(error = %cause, "Inference failed"),
        }

        let message = status.canonical_reason().unwrap_or("Error");
        (status, Json(Envelope::error(status.as_u16(), message))).into_response()
    }
}
