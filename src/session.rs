//! Review submission session
//!
//! [`ReviewSession`] is the controller behind a submission dialog. It owns
//! the context and title, drives the synchronous submission steps, queues
//! the upload and consumes worker events on the task that calls it, so the
//! `after_upload` hook never runs on an upload worker.

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::fs::{Filesystem, LocalFilesystem};
use crate::history::RecentContexts;
use crate::hooks::Hooks;
use crate::playlist::{PlaylistChoice, playlist_choices, recent_playlists};
use crate::submit::{
    ProgressCallback, SubmissionEnv, SubmissionState, execute_submission, queue_upload,
};
use crate::template::TemplateSet;
use crate::tracking::TrackingService;
use crate::types::{Context, EntityRef, SubmissionForm, UploadJob};
use crate::version::VersionStrategy;
use crate::worker::{DataRetriever, TaskId, TaskManager, WorkerEvent};
use chrono::{DateTime, TimeZone};
use std::fmt::{self, Display};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Session settings that come from configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Publish templates
    pub templates: TemplateSet,
    /// Version numbering
    pub strategy: VersionStrategy,
    /// Concurrent background tasks
    pub max_threads: usize,
    /// Whether "jump to panel" is offered on completion
    pub panel_app: bool,
    /// Number of playlists offered
    pub playlist_limit: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl SessionOptions {
    /// Take session settings from `config`
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            templates: config.templates.clone(),
            strategy: config.version_strategy,
            max_threads: config.max_threads,
            panel_app: config.panel_app,
            playlist_limit: config.playlist_limit,
        }
    }
}

/// Buttons available to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Start the submission
    Submit,
    /// Dismiss without submitting
    Cancel,
    /// Open the Version in the site's media viewer
    JumpToReview,
    /// Open the Version in the tracking panel
    JumpToPanel,
    /// Dismiss after completion or failure
    Close,
}

/// Link to a Version in the tracking panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLink {
    /// Record type, always `Version`
    pub entity_type: String,
    /// Version id
    pub id: u64,
}

/// What the dialog shows once the upload finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionView {
    /// Created Version
    pub version_id: u64,
    /// Media viewer address
    pub review_url: String,
    /// Panel link, when the panel app is installed
    pub panel: Option<PanelLink>,
}

impl CompletionView {
    /// Build the view for `version_id` on `site`
    pub fn new(site: &url::Url, version_id: u64, panel_app: bool) -> Self {
        let base = site.as_str().trim_end_matches('/');
        Self {
            version_id,
            review_url: format!("{base}/page/media_center?type=Version&id={version_id}"),
            panel: panel_app.then(|| PanelLink {
                entity_type: "Version".to_string(),
                id: version_id,
            }),
        }
    }
}

/// Part of session teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    /// Writing recent contexts
    SaveHistory,
    /// Stopping the data retriever
    StopRetriever,
    /// Shutting down the task manager
    ShutDownTasks,
}

impl Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SaveHistory => "saving recent contexts",
            Self::StopRetriever => "stopping data retriever",
            Self::ShutDownTasks => "shutting down task manager",
        })
    }
}

/// Teardown steps that failed; the others still ran
#[derive(Debug, Default)]
pub struct TeardownReport {
    /// Failed steps with their errors
    pub failures: Vec<(TeardownStep, Error)>,
}

impl TeardownReport {
    /// Whether every step succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, step: TeardownStep, result: Result<()>) {
        if let Err(e) = result {
            error!("Error {step} on close: {e}");
            self.failures.push((step, e));
        }
    }
}

/// Controller for one review submission
pub struct ReviewSession {
    context: Context,
    title: String,
    hooks: Hooks,
    service: Arc<dyn TrackingService>,
    fs: Arc<dyn Filesystem>,
    options: SessionOptions,
    user: Option<EntityRef>,
    retriever: DataRetriever,
    history: RecentContexts,
    state: SubmissionState,
    completion: Option<CompletionView>,
}

impl ReviewSession {
    /// Open a session for `context`
    ///
    /// Starts the background task manager; call [`ReviewSession::close`]
    /// when done. Must be called inside a tokio runtime.
    pub fn new(
        context: Context,
        service: Arc<dyn TrackingService>,
        hooks: Hooks,
        options: SessionOptions,
    ) -> Self {
        let tasks = Arc::new(TaskManager::new(options.max_threads));
        let retriever = DataRetriever::new(tasks);
        retriever.start();

        let title = hooks.settings.get_title(&context);
        let mut history = RecentContexts::in_memory();
        history.push(context.clone());
        debug!("Review session opened for {context}");

        Self {
            context,
            title,
            hooks,
            service,
            fs: Arc::new(LocalFilesystem),
            options,
            user: None,
            retriever,
            history,
            state: SubmissionState::Idle,
            completion: None,
        }
    }

    /// Use `fs` for disk access
    #[must_use]
    pub fn with_filesystem(mut self, fs: Arc<dyn Filesystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Record `user` as creator of the Version
    #[must_use]
    pub fn with_user(mut self, user: Option<EntityRef>) -> Self {
        self.user = user;
        self
    }

    /// Use `history` for recent contexts; the current context is added
    #[must_use]
    pub fn with_history(mut self, mut history: RecentContexts) -> Self {
        history.push(self.context.clone());
        self.history = history;
        self
    }

    /// Current context
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Switch to another context
    ///
    /// Regenerates the title and remembers the context. Only possible
    /// before submitting.
    pub fn set_context(&mut self, context: Context) -> Result<()> {
        if self.state != SubmissionState::Idle {
            return Err(Error::SubmissionInProgress);
        }
        self.title = self.hooks.settings.get_title(&context);
        self.history.push(context.clone());
        debug!("Context changed to {context}");
        self.context = context;
        Ok(())
    }

    /// Title the Version will get, `{version}` still unexpanded
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Override the generated title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Current submission state
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Completion details, once the upload finished
    pub fn completion(&self) -> Option<&CompletionView> {
        self.completion.as_ref()
    }

    /// Recently used contexts
    pub fn history(&self) -> &RecentContexts {
        &self.history
    }

    /// Background work runner
    pub fn retriever(&self) -> &DataRetriever {
        &self.retriever
    }

    /// Buttons to show for the current state
    pub fn actions(&self) -> Vec<Action> {
        match &self.state {
            SubmissionState::Idle => vec![Action::Submit, Action::Cancel],
            SubmissionState::Complete { .. } => {
                let mut actions = vec![Action::JumpToReview];
                if self.completion.as_ref().is_some_and(|c| c.panel.is_some()) {
                    actions.push(Action::JumpToPanel);
                }
                actions.push(Action::Close);
                actions
            }
            SubmissionState::Failed { .. } => vec![Action::Close],
            _ => Vec::new(),
        }
    }

    /// Playlist selector entries for the current project
    pub async fn load_playlists<Tz>(&self, now: &DateTime<Tz>) -> Result<Vec<PlaylistChoice>>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let playlists = recent_playlists(
            self.service.as_ref(),
            &self.context.project,
            now,
            self.options.playlist_limit,
        )
        .await?;
        Ok(playlist_choices(&playlists, now))
    }

    /// Run the synchronous steps and queue the upload
    ///
    /// The form's title is replaced by the session title when empty. On
    /// error the session moves to `Failed` and the error is returned.
    pub async fn submit(
        &mut self,
        mut form: SubmissionForm,
        progress: &dyn ProgressCallback,
    ) -> Result<TaskId> {
        if self.state != SubmissionState::Idle {
            return Err(Error::SubmissionInProgress);
        }
        if form.title.is_empty() {
            form.title = self.title.clone();
        }
        self.transition(SubmissionState::Submitting, progress).await?;

        let outcome = {
            let env = SubmissionEnv {
                service: self.service.as_ref(),
                fs: self.fs.as_ref(),
                hooks: &self.hooks,
                templates: &self.options.templates,
                strategy: self.options.strategy,
                user: self.user.as_ref(),
            };
            execute_submission(&env, &self.context, &form, progress).await
        };
        let result = match outcome {
            Ok(result) => result,
            Err(e) => return Err(self.fail(e, progress).await),
        };

        let version_id = result.version_id();
        self.transition(SubmissionState::RemoteRecordCreated { version_id }, progress)
            .await?;

        let job = UploadJob {
            version_id,
            file_path: result.request.destination,
        };
        let task = match queue_upload(
            &self.retriever,
            Arc::clone(&self.service),
            Arc::clone(&self.fs),
            job,
        ) {
            Ok(task) => task,
            Err(e) => return Err(self.fail(e, progress).await),
        };
        progress.on_message("Uploading movie to tracking site...").await;
        self.transition(SubmissionState::Uploading { version_id, task }, progress)
            .await?;
        Ok(task)
    }

    /// Consume worker events until the submission is finished
    pub async fn wait_for_completion(
        &mut self,
        progress: &dyn ProgressCallback,
    ) -> Result<&SubmissionState> {
        while matches!(self.state, SubmissionState::Uploading { .. }) {
            match self.retriever.next_event().await {
                Some(event) => self.handle_worker_event(event, progress).await?,
                None => {
                    let e = Error::Worker("worker event channel closed".to_string());
                    return Err(self.fail(e, progress).await);
                }
            }
        }
        Ok(&self.state)
    }

    /// Handle every event that is already waiting, without blocking
    pub async fn poll_worker_events(&mut self, progress: &dyn ProgressCallback) -> Result<()> {
        while let Some(event) = self.retriever.try_next_event() {
            self.handle_worker_event(event, progress).await?;
        }
        Ok(())
    }

    /// Apply a worker event to the session
    ///
    /// Events for other tasks, or arriving outside the upload, are ignored.
    pub async fn handle_worker_event(
        &mut self,
        event: WorkerEvent,
        progress: &dyn ProgressCallback,
    ) -> Result<()> {
        let SubmissionState::Uploading { version_id, task } = self.state else {
            debug!("Ignoring worker event {event:?} while {}", self.state);
            return Ok(());
        };
        if event.uid() != task {
            debug!("Ignoring event for unknown task {}", event.uid());
            return Ok(());
        }

        match event {
            WorkerEvent::Completed { .. } => {
                if let Err(e) = self.hooks.events.after_upload(version_id) {
                    return Err(self.fail(e, progress).await);
                }
                let view =
                    CompletionView::new(self.service.base_url(), version_id, self.options.panel_app);
                info!("Review submitted: {}", view.review_url);
                self.completion = Some(view);
                self.transition(SubmissionState::Complete { version_id }, progress)
                    .await
            }
            WorkerEvent::Failed { message, .. } => {
                Err(self.fail(Error::Worker(message), progress).await)
            }
        }
    }

    /// Tear the session down
    ///
    /// Saves recent contexts, stops the retriever and shuts the task manager
    /// down. Each step runs even when an earlier one failed; failures are
    /// logged and reported, never raised.
    pub fn close(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        report.record(TeardownStep::SaveHistory, self.history.save());
        report.record(TeardownStep::StopRetriever, self.retriever.stop());
        report.record(TeardownStep::ShutDownTasks, self.retriever.tasks().shut_down());
        debug!("Review session closed");
        report
    }

    async fn transition(
        &mut self,
        next: SubmissionState,
        progress: &dyn ProgressCallback,
    ) -> Result<()> {
        self.state.advance(next)?;
        progress.on_state(&self.state).await;
        Ok(())
    }

    async fn fail(&mut self, error: Error, progress: &dyn ProgressCallback) -> Error {
        error!("Review submission failed: {error}");
        if let Err(e) = self.state.advance(SubmissionState::failed(&error)) {
            warn!("Could not record failure: {e}");
        }
        progress.on_error(&error).await;
        progress.on_state(&self.state).await;
        error
    }
}
