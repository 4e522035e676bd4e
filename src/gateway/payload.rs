use serde::{Deserialize, Serialize};

use crate::classifier::Prediction;
use crate::constants::{APP_AUTHOR, APP_NAME, APP_VERSION};

/// Body of `POST /`. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub text_hash: u64,
    pub text: String,
    pub confidence: f32,
    pub nanosecond: i64,
}

impl From<&Prediction> for ClassifyResponse {
    fn from(prediction: &Prediction) -> Self {
        Self {
            text_hash: prediction.content_hash,
            text: prediction.raw_text.clone(),
            confidence: prediction.confidence,
            nanosecond: prediction.latency_ns,
        }
    }
}

/// Standard `{statusCode, message, data}` wrapper used by metadata and errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status_code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

impl Envelope<()> {
    pub fn error(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            data: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    pub author: String,
    pub version: String,
    #[serde(rename = "appName")]
    pub app_name: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            author: APP_AUTHOR.to_string(),
            version: APP_VERSION.to_string(),
            app_name: APP_NAME.to_string(),
        }
    }
}
