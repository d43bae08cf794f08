//! Progress callback trait for interface-agnostic updates
//!
//! This trait allows different front ends (CLI, embedded dialogs) to follow
//! a submission as it moves through its states.

use crate::error::Error;
use crate::submit::SubmissionState;
use async_trait::async_trait;
use std::path::Path;

/// Progress callback trait
///
/// Implement this trait to receive progress updates during submission.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called after every state change
    async fn on_state(&self, state: &SubmissionState);

    /// Called once the publish path is chosen
    async fn on_path_resolved(&self, path: &Path, version: u32);

    /// Called after the media was copied to the publish path
    async fn on_copied(&self, path: &Path, bytes: u64);

    /// Called when the Version record exists
    async fn on_version_created(&self, version_id: u64, code: &str);

    /// Called when the submission fails
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_state(&self, _state: &SubmissionState) {}
    async fn on_path_resolved(&self, _path: &Path, _version: u32) {}
    async fn on_copied(&self, _path: &Path, _bytes: u64) {}
    async fn on_version_created(&self, _version_id: u64, _code: &str) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
