//! CLI commands
//!
//! Command implementations for the `upload-review` binary.

mod context;
mod next_path;
mod playlists;
mod progress;
mod style;
mod submit;

pub use context::run_context;
pub use next_path::run_next_path;
pub use playlists::run_playlists;
pub use submit::{SubmitArgs, run_submit};

use review_upload::config::AppConfig;
use review_upload::error::Result;
use review_upload::tracking::{TrackingService, create_tracking_service};
use std::path::Path;
use std::sync::Arc;

/// Load config and connect to the tracking site
fn connect(config_path: Option<&Path>) -> Result<(AppConfig, Arc<dyn TrackingService>)> {
    let config = AppConfig::load(config_path)?;
    let service = create_tracking_service(&config)?;
    Ok((config, service))
}
