//! Review submission
//!
//! A submission runs in two halves:
//! 1. Synchronous - resolve the publish path, copy the media, create the
//!    Version record (with hooks on either side)
//! 2. Background - upload the media to the record, then remove the copy
//!
//! [`SubmissionState`] tracks where a submission is; the session drives it.

mod execute;
mod plan;
mod progress;
mod state;
mod upload;

pub use execute::{SubmissionEnv, SubmissionResult, execute_submission};
pub use plan::{PublishTarget, build_version_data, gather_publish_fields};
pub use progress::{NoopProgress, ProgressCallback};
pub use state::{Phase, SubmissionState};
pub use upload::{UPLOAD_FIELD, UPLOAD_REQUEST, queue_upload, upload_task};
