//! Submit command - publish a movie for review

use crate::cli::connect;
use crate::cli::progress::CliProgress;
use crate::cli::style::{Stylize, done, failed, review_link};
use anstream::{eprintln, println};
use chrono::Local;
use dialoguer::Select;
use review_upload::error::{Error, Result};
use review_upload::history::RecentContexts;
use review_upload::hooks::HookRegistry;
use review_upload::session::{ReviewSession, SessionOptions};
use review_upload::submit::SubmissionState;
use review_upload::tracking::{context_from_task, user_by_login};
use review_upload::types::SubmissionForm;
use std::path::{Path, PathBuf};

/// Arguments of the submit command
pub struct SubmitArgs {
    /// Movie to submit
    pub file: PathBuf,
    /// Task id
    pub task: u64,
    /// Title override
    pub title: Option<String>,
    /// Description
    pub description: String,
    /// Playlist id
    pub playlist: Option<u64>,
    /// Ask for the playlist
    pub pick_playlist: bool,
}

/// Run the submit command
pub async fn run_submit(config_path: Option<&Path>, args: SubmitArgs) -> Result<()> {
    let (config, service) = connect(config_path)?;
    let hooks = HookRegistry::default().bind(&config.hooks)?;

    let context = context_from_task(service.as_ref(), args.task).await?;
    let user = match &config.user_login {
        Some(login) => user_by_login(service.as_ref(), login).await?,
        None => None,
    };
    let history = config
        .history_path()
        .map_or_else(RecentContexts::in_memory, RecentContexts::load);

    let mut session = ReviewSession::new(
        context,
        service,
        hooks,
        SessionOptions::from_config(&config),
    )
    .with_user(user)
    .with_history(history);

    println!("Submitting for {}", session.context().to_string().highlight());
    if let Some(title) = args.title {
        session.set_title(title);
    }

    let result = submit(
        &mut session,
        args.file,
        args.description,
        args.playlist,
        args.pick_playlist,
    )
    .await;

    let report = session.close();
    for (step, e) in &report.failures {
        eprintln!("  {} Error {step}: {}", failed(), e.to_string().caution());
    }
    result
}

async fn submit(
    session: &mut ReviewSession,
    file: PathBuf,
    description: String,
    playlist: Option<u64>,
    pick_playlist: bool,
) -> Result<()> {
    let playlist_id = if pick_playlist {
        pick(session).await?
    } else {
        playlist
    };

    let form = SubmissionForm {
        source: file,
        title: session.title().to_string(),
        description,
        playlist_id,
    };

    let progress = CliProgress::new();
    session.submit(form, &progress).await?;
    let state = session.wait_for_completion(&progress).await?.clone();
    progress.finish();

    match state {
        SubmissionState::Complete { version_id } => {
            println!("{} Review submitted (Version {})", done(), version_id.highlight());
            if let Some(view) = session.completion() {
                println!("  {}", review_link(&view.review_url));
            }
            Ok(())
        }
        SubmissionState::Failed { message } => Err(Error::Worker(message)),
        other => Err(Error::Worker(format!("submission stopped while {other}"))),
    }
}

async fn pick(session: &ReviewSession) -> Result<Option<u64>> {
    let choices = session.load_playlists(&Local::now()).await?;
    let captions: Vec<&str> = choices.iter().map(|c| c.caption.as_str()).collect();
    let index = Select::new()
        .with_prompt("Playlist")
        .items(&captions)
        .default(0)
        .interact()
        .map_err(|e| Error::Interaction(e.to_string()))?;
    Ok(choices.get(index).and_then(|c| c.id))
}
