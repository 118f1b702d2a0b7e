use std::sync::Arc;

use rf_speed_api::{app, ApiConfig, AppState, SpeedModel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cfg = ApiConfig::from_env()?;

    let mdl = SpeedModel::load(&cfg.model_path, &cfg.meta_path)?;
    // Warmup forward before accepting traffic
    let _ = mdl.predict_speed(&vec![0.0; mdl.in_dim()])?;
    tracing::info!("warmup forward ok");
    tracing::info!(
        "loaded model from {}; feat_list[{}]: {:?}",
        cfg.model_path,
        mdl.in_dim(),
        mdl.feature_names()
    );

    let port = cfg.port;
    let state = AppState {
        mdl: Arc::new(mdl),
        cfg: Arc::new(cfg),
    };

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
