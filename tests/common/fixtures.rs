//! Test data factories for review-upload types
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use review_upload::error::{Error, Result};
use review_upload::fs::{Filesystem, LocalFilesystem};
use review_upload::hooks::{EventsHook, Hooks, SettingsHook};
use review_upload::template::TemplateSet;
use review_upload::types::{Context, Entity, EntityRef, RecordData};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

/// Context for shot `sh010` in sequence `sq01`
pub fn shot_context() -> Context {
    Context {
        project: EntityRef::new("Project", 1, "demo"),
        entity: Some(EntityRef::new("Shot", 10, "sh010")),
        step: Some(EntityRef::new("Step", 20, "Comp")),
        task: Some(EntityRef::new("Task", 30, "comp")),
    }
}

/// Context for asset `hero`
pub fn asset_context() -> Context {
    Context {
        project: EntityRef::new("Project", 1, "demo"),
        entity: Some(EntityRef::new("Asset", 11, "hero")),
        step: Some(EntityRef::new("Step", 21, "Model")),
        task: Some(EntityRef::new("Task", 31, "model")),
    }
}

/// Build an entity with the given fields
pub fn make_entity(entity_type: &str, id: u64, fields: Value) -> Entity {
    let fields: RecordData = match fields {
        Value::Object(map) => map,
        _ => RecordData::new(),
    };
    Entity {
        entity_type: entity_type.to_string(),
        id,
        fields,
    }
}

/// Shot record with its sequence link
pub fn shot_entity() -> Entity {
    make_entity(
        "Shot",
        10,
        json!({ "sg_sequence": { "type": "Sequence", "id": 5, "name": "sq01" } }),
    )
}

/// Asset record with its asset type
pub fn asset_entity() -> Entity {
    make_entity("Asset", 11, json!({ "sg_asset_type": "Character" }))
}

/// Task record as returned for the shot context
pub fn task_entity() -> Entity {
    make_entity(
        "Task",
        30,
        json!({
            "content": "comp",
            "project": { "type": "Project", "id": 1, "name": "demo" },
            "entity": { "type": "Shot", "id": 10, "name": "sh010" },
            "step": { "type": "Step", "id": 20, "name": "Comp" },
        }),
    )
}

/// Templates rooted in `root` with a short shot pattern
pub fn templates(root: &Path) -> TemplateSet {
    TemplateSet {
        root: root.to_path_buf(),
        shot_review_mov_publish: "{Sequence}/{Shot}/{Step}/{Shot}_{Task}_v{version:03}.mov"
            .to_string(),
        asset_review_mov_publish: "{Asset_Type}/{Asset}/{Asset}_{Task}_v{version:03}.mov"
            .to_string(),
    }
}

/// Write a small movie file and return its path
pub fn write_movie(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"not really a movie").unwrap();
    path
}

/// Ordered log of calls shared between mocks and hooks
#[derive(Debug, Default)]
pub struct EventLog(Mutex<Vec<String>>);

impl EventLog {
    /// Append an entry
    pub fn push(&self, entry: &str) {
        self.0.lock().unwrap().push(entry.to_string());
    }

    /// All entries so far
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Position of the first `entry`
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }
}

/// Settings with a fixed timestamp
pub struct FixedSettings;

impl SettingsHook for FixedSettings {
    fn get_title(&self, context: &Context) -> String {
        format!("v{{version}}_{}_review", context.task_name().unwrap_or_default())
    }

    fn get_timestamp(&self, _context: &Context) -> String {
        "20240624".to_string()
    }
}

/// Events hook that records calls and the thread they ran on
#[derive(Default)]
pub struct RecordingEvents {
    log: Arc<EventLog>,
    after_upload_threads: Mutex<Vec<ThreadId>>,
    fail_before: Mutex<Option<String>>,
    fail_after_upload: Mutex<Option<String>>,
}

impl RecordingEvents {
    /// Record into `log`
    pub fn with_log(log: Arc<EventLog>) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    /// Make `before_version_creation` fail
    pub fn fail_before(&self, msg: &str) {
        *self.fail_before.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `after_upload` fail
    pub fn fail_after_upload(&self, msg: &str) {
        *self.fail_after_upload.lock().unwrap() = Some(msg.to_string());
    }

    /// Threads `after_upload` ran on
    pub fn after_upload_threads(&self) -> Vec<ThreadId> {
        self.after_upload_threads.lock().unwrap().clone()
    }
}

impl EventsHook for RecordingEvents {
    fn before_version_creation(&self, mut data: RecordData) -> Result<RecordData> {
        self.log.push("before_version_creation");
        if let Some(msg) = self.fail_before.lock().unwrap().as_ref() {
            return Err(Error::hook("recording", msg.clone()));
        }
        data.insert("sg_status_list".into(), json!("rev"));
        Ok(data)
    }

    fn after_version_creation(&self, _version_id: u64) -> Result<()> {
        self.log.push("after_version_creation");
        Ok(())
    }

    fn after_upload(&self, _version_id: u64) -> Result<()> {
        self.log.push("after_upload");
        self.after_upload_threads
            .lock()
            .unwrap()
            .push(std::thread::current().id());
        if let Some(msg) = self.fail_after_upload.lock().unwrap().as_ref() {
            return Err(Error::hook("recording", msg.clone()));
        }
        Ok(())
    }
}

/// Hooks with fixed settings and the given events hook
pub fn hooks_with(events: Arc<RecordingEvents>) -> Hooks {
    Hooks::new(Arc::new(FixedSettings), events)
}

/// Local filesystem that counts removals and can fail copies
#[derive(Default)]
pub struct CountingFs {
    removals: Mutex<HashMap<PathBuf, usize>>,
    fail_copy: Mutex<Option<String>>,
}

impl CountingFs {
    /// Make `copy` fail
    pub fn fail_copy(&self, msg: &str) {
        *self.fail_copy.lock().unwrap() = Some(msg.to_string());
    }

    /// How often `path` was removed
    pub fn removals(&self, path: &Path) -> usize {
        self.removals
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or_default()
    }

    /// Total number of removals
    pub fn total_removals(&self) -> usize {
        self.removals.lock().unwrap().values().sum()
    }
}

impl Filesystem for CountingFs {
    fn exists(&self, path: &Path) -> bool {
        LocalFilesystem.exists(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        LocalFilesystem.create_dir_all(path)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<u64> {
        if let Some(msg) = self.fail_copy.lock().unwrap().as_ref() {
            return Err(Error::Filesystem {
                op: "copy",
                path: from.to_path_buf(),
                source: std::io::Error::other(msg.clone()),
            });
        }
        LocalFilesystem.copy(from, to)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        *self
            .removals
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_default() += 1;
        LocalFilesystem.remove_file(path)
    }
}
