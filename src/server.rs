use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::ApiConfig;
use crate::features;
use crate::model::SpeedModel;
use crate::types::{PredictionRequest, PredictionResponse};

/// The only model identifier currently deployed.
pub const RANDOM_FOREST: &str = "randomforest";

#[derive(Clone)]
pub struct AppState {
    pub mdl: Arc<SpeedModel>,
    pub cfg: Arc<ApiConfig>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unknown model '{0}'")]
    UnknownModel(String),
    #[error("prediction failed: {0}")]
    Inference(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::UnknownModel(_) => StatusCode::BAD_REQUEST,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/predict", post(predict))
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Random Forest Speed Prediction API is running!" }))
}

async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictionRequest>,
) -> Result<Json<PredictionResponse>, ApiError> {
    info!(
        model = %payload.model,
        lat = payload.coordinates.lat,
        lng = payload.coordinates.lng,
        when = %payload.prediction_time,
        "received prediction request"
    );
    let response = run_prediction(&state.mdl, &state.cfg, &payload)?;
    info!(avg_speed = response.predictions.avg_speed, "sending response");
    Ok(Json(response))
}

/// The whole translation step: validate the selector, resolve the time
/// window, encode, infer, clamp and format.
pub fn run_prediction(
    mdl: &SpeedModel,
    cfg: &ApiConfig,
    req: &PredictionRequest,
) -> Result<PredictionResponse, ApiError> {
    if req.model != RANDOM_FOREST {
        return Err(ApiError::UnknownModel(req.model.clone()));
    }

    let when = features::resolve_prediction_time(&req.prediction_time);
    // Coordinate-to-junction mapping is not wired up yet; serve the
    // configured default and keep the coordinates in the logs.
    let junction = cfg.default_junction.as_str();
    let vec = features::encode(when, junction);

    // Debug signal so we can confirm the encoder isn't sending all-zeros
    if std::env::var("LOG_PRED").ok().as_deref() == Some("1") {
        let nz = vec.iter().filter(|x| **x != 0.0).count();
        let mut sample = vec![];
        for (i, name) in mdl.feature_names().iter().take(4).enumerate() {
            sample.push(format!("{}={:.1}", name, vec[i]));
        }
        info!(
            "encoded junction={} in_dim={} nonzero={} sample=[{}]",
            junction,
            vec.len(),
            nz,
            sample.join(", ")
        );
    }

    let raw = mdl.predict_speed(&vec)?;
    info!(raw_speed = raw, junction = junction, "ensemble prediction");

    Ok(PredictionResponse::from_speed(raw))
}
