//! Synchronous submission steps
//!
//! Everything up to and including Version creation runs inline on the
//! caller's task; only the upload is handed to a worker.

use crate::error::{Error, Result};
use crate::fs::{Filesystem, ensure_parent_dir};
use crate::hooks::Hooks;
use crate::submit::{ProgressCallback, build_version_data, gather_publish_fields};
use crate::template::TemplateSet;
use crate::tracking::TrackingService;
use crate::types::{Context, Entity, EntityRef, SubmissionForm, SubmissionRequest};
use crate::version::{VersionStrategy, next_publish_path};
use tracing::{debug, info};

/// Collaborators the synchronous steps need
pub struct SubmissionEnv<'a> {
    /// Tracking site
    pub service: &'a dyn TrackingService,
    /// Disk access
    pub fs: &'a dyn Filesystem,
    /// Bound hooks
    pub hooks: &'a Hooks,
    /// Publish templates
    pub templates: &'a TemplateSet,
    /// Version numbering
    pub strategy: VersionStrategy,
    /// Submitting user, when known
    pub user: Option<&'a EntityRef>,
}

/// Result of the synchronous steps
#[derive(Debug, Clone)]
pub struct SubmissionResult {
    /// Everything that was resolved
    pub request: SubmissionRequest,
    /// The created Version
    pub version: Entity,
}

impl SubmissionResult {
    /// Id of the created Version
    pub const fn version_id(&self) -> u64 {
        self.version.id
    }
}

/// Copy the media to its publish path and create the Version
///
/// Order: resolve path, copy, `before_version_creation`, create,
/// `after_version_creation`. Any error stops the sequence; a record that
/// was already created is left in place.
pub async fn execute_submission(
    env: &SubmissionEnv<'_>,
    context: &Context,
    form: &SubmissionForm,
    progress: &dyn ProgressCallback,
) -> Result<SubmissionResult> {
    if form.source.as_os_str().is_empty() {
        return Err(Error::NoSourceFile);
    }
    if !env.fs.exists(&form.source) {
        return Err(Error::SourceMissing(form.source.clone()));
    }

    let target =
        gather_publish_fields(env.service, context, env.hooks.settings.as_ref(), env.templates)
            .await?;
    let (destination, fields) =
        next_publish_path(&target.template, target.fields, env.fs, env.strategy)?;
    let version = fields.version().unwrap_or_default();
    progress.on_path_resolved(&destination, version).await;

    ensure_parent_dir(env.fs, &destination)?;
    let bytes = env.fs.copy(&form.source, &destination)?;
    debug!(
        "Copied {} to {} ({bytes} bytes)",
        form.source.display(),
        destination.display()
    );
    progress.on_copied(&destination, bytes).await;

    let request = SubmissionRequest {
        source: form.source.clone(),
        destination,
        title: form.title.clone(),
        description: form.description.clone(),
        playlist_id: form.playlist_id,
        fields,
    };

    let data = build_version_data(context, &request, env.user);
    let data = env.hooks.events.before_version_creation(data)?;

    let created = env.service.create("Version", data).await?;
    let code = created.str_field("code").unwrap_or_default().to_string();
    info!("Version {} created in tracking site", created.id);
    progress.on_version_created(created.id, &code).await;

    env.hooks.events.after_version_creation(created.id)?;

    Ok(SubmissionResult {
        request,
        version: created,
    })
}
