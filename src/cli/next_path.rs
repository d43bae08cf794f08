//! Next-path command - show where the next review would be published

use crate::cli::connect;
use crate::cli::style::{pointer, version_label};
use anstream::println;
use review_upload::error::Result;
use review_upload::fs::LocalFilesystem;
use review_upload::hooks::HookRegistry;
use review_upload::submit::gather_publish_fields;
use review_upload::tracking::context_from_task;
use review_upload::version::next_publish_path;
use std::path::Path;

/// Run the next-path command
///
/// Resolves the path without copying anything or creating records.
pub async fn run_next_path(config_path: Option<&Path>, task: u64) -> Result<()> {
    let (config, service) = connect(config_path)?;
    let hooks = HookRegistry::default().bind(&config.hooks)?;
    let context = context_from_task(service.as_ref(), task).await?;

    let target = gather_publish_fields(
        service.as_ref(),
        &context,
        hooks.settings.as_ref(),
        &config.templates,
    )
    .await?;
    let (path, fields) = next_publish_path(
        &target.template,
        target.fields,
        &LocalFilesystem,
        config.version_strategy,
    )?;

    println!(
        "{} {} {}",
        pointer(),
        version_label(fields.version().unwrap_or_default()),
        path.display()
    );
    Ok(())
}
