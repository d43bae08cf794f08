//! Tracking service factory
//!
//! Creates the tracking service described by configuration.

use crate::config::AppConfig;
use crate::error::Result;
use crate::tracking::{RestTrackingService, TrackingService};
use std::sync::Arc;

/// Create a tracking service from configuration
pub fn create_tracking_service(config: &AppConfig) -> Result<Arc<dyn TrackingService>> {
    let site = config.site_url()?.clone();
    let token = config.access_token()?.to_string();
    Ok(Arc::new(RestTrackingService::new(site, token)))
}
