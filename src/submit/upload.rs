//! Background media upload

use crate::error::Result;
use crate::fs::{Filesystem, RemoveOnDrop};
use crate::tracking::TrackingService;
use crate::types::UploadJob;
use crate::worker::{DataRetriever, TaskId};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Version field the media is uploaded into
pub const UPLOAD_FIELD: &str = "sg_uploaded_movie";

/// Request type reported for upload work
pub const UPLOAD_REQUEST: &str = "upload_review_media";

/// Build the upload future for `job`
///
/// The local file is removed exactly once when the future finishes, fails
/// or is dropped, including when it is dropped without ever running.
pub fn upload_task(
    service: Arc<dyn TrackingService>,
    fs: Arc<dyn Filesystem>,
    job: UploadJob,
) -> impl Future<Output = Result<()>> + Send + 'static {
    let cleanup = RemoveOnDrop::new(fs, job.file_path.clone());
    async move {
        let _cleanup = cleanup;
        debug!("Uploading movie to tracking site...");
        service
            .upload("Version", job.version_id, &job.file_path, UPLOAD_FIELD)
            .await?;
        debug!("...Upload complete!");
        Ok(())
    }
}

/// Queue the upload for `job` on the retriever
pub fn queue_upload(
    retriever: &DataRetriever,
    service: Arc<dyn TrackingService>,
    fs: Arc<dyn Filesystem>,
    job: UploadJob,
) -> Result<TaskId> {
    retriever.execute_method(UPLOAD_REQUEST, upload_task(service, fs, job))
}
