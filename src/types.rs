use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Body of `POST /predict`, as sent by the routing frontend.
#[derive(Debug, Deserialize)]
pub struct PredictionRequest {
    /// Model selector; only "randomforest" is deployed.
    pub model: String,
    /// Used for logging only until coordinate-to-junction mapping lands.
    pub coordinates: Coordinates,
    #[serde(rename = "predictionTime")]
    pub prediction_time: String,
    /// Accepted for forward compatibility, currently ignored.
    #[serde(default)]
    pub event: Option<String>,
}

/// Placeholder congestion block the frontend display expects alongside
/// the speed figure.
#[derive(Debug, Serialize)]
pub struct Congestion {
    pub level: f32,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Predictions {
    pub congestion: Congestion,
    #[serde(rename = "avgSpeed")]
    pub avg_speed: f32,
}

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub predictions: Predictions,
    /// Always null until alternative-route logic exists.
    #[serde(rename = "alternativeRoute")]
    pub alternative_route: Option<serde_json::Value>,
}

impl PredictionResponse {
    /// Clamp the raw model output to a non-negative speed, round to one
    /// decimal, and wrap it in the shape the frontend consumes.
    pub fn from_speed(raw: f32) -> Self {
        let avg_speed = (raw.max(0.0) * 10.0).round() / 10.0;
        Self {
            predictions: Predictions {
                congestion: Congestion {
                    level: 0.0,
                    label: "Unknown",
                },
                avg_speed,
            },
            alternative_route: None,
        }
    }
}
