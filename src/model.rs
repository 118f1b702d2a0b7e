use anyhow::{anyhow, bail, Context, Result};
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::features;

#[derive(Deserialize)]
struct MetaJson {
    feat_list: Vec<String>,
    in_dim: Option<usize>,
}

/// The loaded tree ensemble plus the authoritative input column order.
pub struct SpeedModel {
    ensemble: GBDT,
    feat_names: Vec<String>,
}

impl std::fmt::Debug for SpeedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpeedModel")
            .field("feat_names", &self.feat_names)
            .finish_non_exhaustive()
    }
}

impl SpeedModel {
    /// Load the serialized ensemble and its metadata.
    ///
    /// The metadata's `feat_list` must match the encoder's column order
    /// exactly; a model trained against different columns is refused here
    /// instead of producing garbage per request.
    pub fn load(model_path: &str, meta_path: &str) -> Result<Self> {
        let meta_txt = fs::read_to_string(Path::new(meta_path))
            .with_context(|| format!("failed to read meta at {}", meta_path))?;
        let meta: MetaJson =
            serde_json::from_str(&meta_txt).with_context(|| "failed to parse meta JSON")?;

        let expected = features::feature_names();
        if meta.feat_list != expected {
            bail!(
                "model feature list does not match encoder columns: model has {} [{}...], encoder expects {} [{}...]",
                meta.feat_list.len(),
                meta.feat_list.first().map(String::as_str).unwrap_or(""),
                expected.len(),
                expected[0],
            );
        }
        if let Some(in_dim) = meta.in_dim {
            if in_dim != expected.len() {
                bail!("meta in_dim ({}) != feature count ({})", in_dim, expected.len());
            }
        }

        let ensemble = GBDT::load_model(model_path)
            .map_err(|e| anyhow!("failed to load ensemble from {}: {}", model_path, e))?;

        Ok(Self::from_parts(ensemble, meta.feat_list))
    }

    /// Wrap an already-built ensemble. `feat_names` is trusted to be the
    /// order the ensemble was fit against.
    pub fn from_parts(ensemble: GBDT, feat_names: Vec<String>) -> Self {
        Self { ensemble, feat_names }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feat_names
    }

    pub fn in_dim(&self) -> usize {
        self.feat_names.len()
    }

    /// Run one regression forward. Returns the raw predicted speed; the
    /// caller owns clamping and formatting.
    pub fn predict_speed(&self, x: &[f32]) -> Result<f32> {
        if x.len() != self.feat_names.len() {
            bail!(
                "feature length mismatch: got {}, expected {}",
                x.len(),
                self.feat_names.len()
            );
        }

        let batch: DataVec = vec![Data::new_test_data(x.to_vec(), None)];
        let preds = self.ensemble.predict(&batch);
        let speed = preds
            .first()
            .copied()
            .ok_or_else(|| anyhow!("ensemble returned no prediction"))?;
        if !speed.is_finite() {
            bail!("ensemble returned a non-finite prediction: {}", speed);
        }
        Ok(speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;
    use gbdt::config::Config;

    /// Fit a small ensemble on synthetic calendar data: weekends faster,
    /// peak hours slower. Enough structure for assertions without fixture
    /// files.
    fn tiny_model() -> SpeedModel {
        let mut cfg = Config::new();
        cfg.set_feature_size(FEATURE_COUNT);
        cfg.set_max_depth(3);
        cfg.set_min_leaf_size(1);
        cfg.set_iterations(15);
        cfg.set_shrinkage(0.3);
        cfg.set_loss("SquaredError");

        let mut training: DataVec = Vec::new();
        for day in 0..7u32 {
            for hour in 0..24u32 {
                let mut x = vec![0.0f32; FEATURE_COUNT];
                x[0] = hour as f32;
                x[1] = day as f32;
                x[2] = 10.0;
                x[3] = if day >= 5 { 1.0 } else { 0.0 };
                x[4 + (day as usize % 16)] = 1.0;
                let peak = hour >= 8 && hour <= 10;
                let label = if day >= 5 {
                    42.0
                } else if peak {
                    12.0
                } else {
                    28.0
                };
                training.push(Data::new_training_data(x, 1.0, label, None));
            }
        }

        let mut ensemble = GBDT::new(&cfg);
        ensemble.fit(&mut training);
        SpeedModel::from_parts(ensemble, features::feature_names())
    }

    #[test]
    fn test_predict_returns_finite_speed() {
        let mdl = tiny_model();
        let x = features::encode(
            chrono::NaiveDate::from_ymd_opt(2025, 10, 15)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            "Intersection_Hebbal Flyover",
        );
        let speed = mdl.predict_speed(&x).unwrap();
        assert!(speed.is_finite());
    }

    #[test]
    fn test_predict_learns_weekday_peak() {
        let mdl = tiny_model();
        let mut peak = vec![0.0f32; FEATURE_COUNT];
        peak[0] = 9.0;
        peak[1] = 2.0;
        peak[2] = 10.0;
        let mut weekend = vec![0.0f32; FEATURE_COUNT];
        weekend[0] = 9.0;
        weekend[1] = 6.0;
        weekend[2] = 10.0;
        weekend[3] = 1.0;

        let peak_speed = mdl.predict_speed(&peak).unwrap();
        let weekend_speed = mdl.predict_speed(&weekend).unwrap();
        assert!(
            weekend_speed > peak_speed,
            "weekend {} should beat weekday peak {}",
            weekend_speed,
            peak_speed
        );
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let mdl = tiny_model();
        let err = mdl.predict_speed(&[1.0, 2.0, 3.0]).unwrap_err();
        assert!(err.to_string().contains("feature length mismatch"));
    }

    #[test]
    fn test_warmup_on_zero_vector() {
        let mdl = tiny_model();
        assert!(mdl.predict_speed(&vec![0.0; mdl.in_dim()]).is_ok());
    }

    #[test]
    fn test_meta_mismatch_is_refused() {
        // load() is exercised end to end elsewhere; here just the
        // validation logic via a meta file with a truncated column list.
        let dir = std::env::temp_dir().join("rf_speed_api_meta_test");
        std::fs::create_dir_all(&dir).unwrap();
        let meta_path = dir.join("meta.json");
        std::fs::write(&meta_path, r#"{"feat_list": ["hour", "month"]}"#).unwrap();

        let err = SpeedModel::load("/nonexistent.gbdt", meta_path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("does not match encoder columns"));
    }
}
