use crate::config::Config;
use crate::models::Severity;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

/// Reported when the classifier returns no predictions.
pub const FALLBACK_CONFIDENCE: u8 = 95;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("classifier credential is not configured")]
    MissingCredential,

    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier responded with status {0}")]
    Status(u16),
}

#[derive(Debug, Deserialize)]
pub struct Prediction {
    pub class: String,
    pub confidence: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub conditions: Vec<String>,
    pub confidence: u8,
}

impl Detection {
    /// Distinct labels in order of first appearance, plus the mean confidence
    /// as a whole percentage.
    pub fn from_predictions(predictions: &[Prediction]) -> Self {
        let mut conditions: Vec<String> = Vec::new();
        for prediction in predictions {
            if !conditions.iter().any(|seen| seen == &prediction.class) {
                conditions.push(prediction.class.clone());
            }
        }

        let confidence = if predictions.is_empty() {
            FALLBACK_CONFIDENCE
        } else {
            let mean = predictions.iter().map(|p| p.confidence).sum::<f64>()
                / predictions.len() as f64;
            (mean * 100.0).round().clamp(0.0, 100.0) as u8
        };

        Self {
            conditions,
            confidence,
        }
    }

    pub fn severity(&self) -> Severity {
        Severity::from_condition_count(self.conditions.len())
    }
}

pub struct DetectionClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl DetectionClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.detect_endpoint.clone(), config.detect_api_key.clone())
    }

    /// One request, no retry and no client-side timeout.
    pub async fn detect(&self, image_base64: &str) -> Result<Detection, DetectError> {
        let api_key = self.api_key.as_deref().ok_or(DetectError::MissingCredential)?;

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("api_key", api_key)])
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(image_base64.to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::Status(status.as_u16()));
        }

        let body: PredictionResponse = response.json().await?;
        let detection = Detection::from_predictions(&body.predictions);
        info!(
            "classifier returned {} predictions, {} distinct",
            body.predictions.len(),
            detection.conditions.len()
        );
        Ok(detection)
    }
}

/// Strips a `data:<mime>;base64,` prefix if present.
pub fn strip_data_url(image: &str) -> &str {
    let image = image.trim();
    match image.split_once(',') {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => image,
    }
}

/// Decoded payload size in KB, rounded up. `None` if the payload is not valid base64.
pub fn decoded_size_kb(payload: &str) -> Option<u64> {
    let bytes = STANDARD.decode(payload).ok()?;
    Some((bytes.len() as u64).div_ceil(1024))
}
