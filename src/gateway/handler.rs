use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, instrument};

use crate::gateway::error::GatewayError;
use crate::gateway::payload::{ClassifyRequest, ClassifyResponse, Envelope};
use crate::gateway::state::AppState;

/// `GET /`: static service metadata.
#[instrument(skip(state))]
pub async fn metadata_handler(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(Envelope::success(state.metadata.clone()))).into_response()
}

/// `POST /`: classify `{"text": ...}`.
///
/// The body is parsed regardless of `Content-Type`. Classification runs on the
/// blocking pool; a panic there is reported as an inference failure.
#[instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn classify_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let request = parse_classify_request(&body)?;

    let classifier = state.classifier.clone();
    let prediction = tokio::task::spawn_blocking(move || classifier.classify(&request.text))
        .await
        .map_err(|e| GatewayError::aborted(e.to_string()))??;

    let response = (StatusCode::OK, Json(ClassifyResponse::from(&prediction))).into_response();

    if let Some(sink) = &state.sink {
        sink.record(&prediction);
    }

    debug!(text_hash = prediction.content_hash, "Prediction served");
    Ok(response)
}

pub(crate) fn parse_classify_request(body: &[u8]) -> Result<ClassifyRequest, GatewayError> {
    if body.is_empty() {
        return Err(GatewayError::MalformedRequest("empty body".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| GatewayError::MalformedRequest(e.to_string()))
}
