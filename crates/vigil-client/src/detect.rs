//! Vehicle image verification against a pretrained object-detection model
//! served over HTTP.
//!
//! Single-shot inference with no state between calls. The verdict is
//! advisory: a mismatch warns the submitter next to the upload field but
//! never blocks the complaint.

use serde::Deserialize;
use tracing::debug;

use vigil_shared::types::VehicleType;

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// Bytes are not a decodable image.
    #[error("Not a recognizable image")]
    NotAnImage,

    #[error("Inference request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// One detection reported by the model.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Detection {
    pub class: String,
    pub confidence: f64,
}

/// Classes the model may report for each selectable vehicle type.
pub fn expected_classes(vehicle_type: VehicleType) -> &'static [&'static str] {
    match vehicle_type {
        VehicleType::Car => &["car", "truck", "bus"],
        VehicleType::Bike => &["motorcycle", "bicycle"],
        VehicleType::Truck => &["truck", "bus", "car"],
        VehicleType::Other => &[],
    }
}

/// Advisory verdict shown next to the upload field.
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    /// Some detection matches the declared vehicle type.
    Verified { class: String, confidence: f64 },
    /// The model saw something else entirely; warn, don't block.
    Mismatch { top_class: String },
    NothingDetected,
}

/// Check the detections against the declared type. The first matching
/// detection wins.
pub fn verify(vehicle_type: VehicleType, detections: &[Detection]) -> Verification {
    let expected = expected_classes(vehicle_type);
    if let Some(hit) = detections
        .iter()
        .find(|d| expected.contains(&d.class.as_str()))
    {
        return Verification::Verified {
            class: hit.class.clone(),
            confidence: hit.confidence,
        };
    }
    match detections.first() {
        Some(top) => Verification::Mismatch {
            top_class: top.class.clone(),
        },
        None => Verification::NothingDetected,
    }
}

/// HTTP client for the inference endpoint.
pub struct DetectorClient {
    http: reqwest::Client,
    url: String,
}

impl DetectorClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }

    /// Build from configuration; `None` when no inference endpoint is
    /// configured (verification disabled).
    pub fn from_config(config: &crate::config::AppConfig) -> Option<Self> {
        config.detector_url.as_deref().map(Self::new)
    }

    /// Run one inference over raw image bytes. The bytes are sniffed
    /// locally first so obviously broken uploads never hit the network.
    pub async fn detect(&self, image_bytes: &[u8]) -> Result<Vec<Detection>, DetectError> {
        if image::guess_format(image_bytes).is_err() {
            return Err(DetectError::NotAnImage);
        }

        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image_bytes.to_vec())
            .send()
            .await?
            .error_for_status()?;

        let detections = response.json::<Vec<Detection>>().await?;
        debug!(count = detections.len(), "inference complete");
        Ok(detections)
    }
}
