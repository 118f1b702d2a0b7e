use anyhow::{bail, Result};

use crate::features;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub model_path: String,
    pub meta_path: String,
    pub port: u16,
    /// Junction served while coordinate mapping is unimplemented.
    pub default_junction: String,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        let model_path = env_or("MODEL_PATH", "data/rf_speed_model.gbdt");
        let meta_path = env_or("META_PATH", "data/rf_speed_meta.json");
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);
        let default_junction = env_or("DEFAULT_JUNCTION", "Intersection_Trinity Circle");

        if !features::is_known_junction(&default_junction) {
            bail!(
                "DEFAULT_JUNCTION '{}' is not a junction the model was trained on",
                default_junction
            );
        }

        Ok(Self {
            model_path,
            meta_path,
            port,
            default_junction,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
