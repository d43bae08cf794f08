//! CLI progress callback with styled output and a spinner

use crate::cli::style::{Stylize, done, failed, upload_spinner, version_label};
use anstream::{eprintln, println};
use async_trait::async_trait;
use indicatif::ProgressBar;
use review_upload::error::Error;
use review_upload::submit::{ProgressCallback, SubmissionState};
use std::path::Path;
use std::time::Duration;

/// Prints each submission step; spins while the upload runs
pub struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    /// Create progress output with a hidden spinner
    pub fn new() -> Self {
        Self {
            spinner: ProgressBar::hidden(),
        }
    }

    /// Stop the spinner, if it is running
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_state(&self, state: &SubmissionState) {
        match state {
            SubmissionState::Uploading { .. } => {
                self.spinner
                    .set_draw_target(indicatif::ProgressDrawTarget::stderr());
                self.spinner.set_style(upload_spinner());
                self.spinner.set_message("Uploading movie...");
                self.spinner.enable_steady_tick(Duration::from_millis(80));
            }
            SubmissionState::Complete { .. } | SubmissionState::Failed { .. } => {
                self.spinner.finish_and_clear();
            }
            _ => {}
        }
    }

    async fn on_path_resolved(&self, path: &Path, version: u32) {
        println!(
            "  Publishing version {} to {}",
            version_label(version),
            path.display().detail()
        );
    }

    async fn on_copied(&self, path: &Path, bytes: u64) {
        println!(
            "  {} Copied {} {}",
            done(),
            path.file_name().unwrap_or_default().to_string_lossy(),
            format!("({bytes} bytes)").detail()
        );
    }

    async fn on_version_created(&self, version_id: u64, code: &str) {
        println!(
            "  {} Created Version {} {}",
            done(),
            code.heading(),
            format!("#{version_id}").detail()
        );
    }

    async fn on_error(&self, err: &Error) {
        self.spinner.finish_and_clear();
        eprintln!("  {} {}", failed(), err.to_string().failure());
    }

    async fn on_message(&self, message: &str) {
        println!("  {}", message.detail());
    }
}
