// rf_speed_api - serves the trained random-forest speed model over HTTP.
// The interesting parts are the fixed-order feature encoding (features)
// and the process-lifetime model handle (model); everything else is a
// thin translation layer around them.

pub mod config;
pub mod features;
pub mod model;
pub mod server;
pub mod types;

pub use config::ApiConfig;
pub use model::SpeedModel;
pub use server::{app, AppState};
