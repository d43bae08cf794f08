//! Mock tracking service for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use crate::common::fixtures::EventLog;
use async_trait::async_trait;
use review_upload::error::{Error, Result};
use review_upload::tracking::{Query, TrackingService};
use review_upload::types::{Entity, RecordData};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use tokio::sync::Notify;
use url::Url;

/// Call record for `find`
#[derive(Debug, Clone, PartialEq)]
pub struct FindCall {
    pub entity_type: String,
    pub query: Query,
}

/// Call record for `create`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCall {
    pub entity_type: String,
    pub data: RecordData,
}

/// Call record for `upload`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub entity_type: String,
    pub entity_id: u64,
    pub path: PathBuf,
    pub field_name: String,
    /// Whether the file was still on disk when the upload started
    pub file_existed: bool,
    /// Thread the upload ran on
    pub thread: ThreadId,
}

/// Simple mock tracking service for testing
///
/// Features:
/// - Auto-incrementing record ids
/// - Canned `find` responses per entity type
/// - Call tracking for verification
/// - Error injection for failure path testing
/// - Holding uploads until released
pub struct MockTrackingService {
    base_url: Url,
    log: Arc<EventLog>,
    next_id: AtomicU64,
    find_responses: Mutex<HashMap<String, Vec<Entity>>>,
    // Call tracking
    find_calls: Mutex<Vec<FindCall>>,
    create_calls: Mutex<Vec<CreateCall>>,
    upload_calls: Mutex<Vec<UploadCall>>,
    // Error injection
    error_on_find: Mutex<Option<String>>,
    error_on_create: Mutex<Option<String>>,
    error_on_upload: Mutex<Option<String>>,
    upload_gate: Mutex<Option<Arc<Notify>>>,
    upload_started: Notify,
}

impl MockTrackingService {
    /// Create a mock for `https://studio.example.com`
    pub fn new() -> Self {
        Self::with_log(Arc::new(EventLog::default()))
    }

    /// Create a mock that records into a shared log
    pub fn with_log(log: Arc<EventLog>) -> Self {
        Self {
            base_url: Url::parse("https://studio.example.com").unwrap(),
            log,
            next_id: AtomicU64::new(100),
            find_responses: Mutex::new(HashMap::new()),
            find_calls: Mutex::new(Vec::new()),
            create_calls: Mutex::new(Vec::new()),
            upload_calls: Mutex::new(Vec::new()),
            error_on_find: Mutex::new(None),
            error_on_create: Mutex::new(None),
            error_on_upload: Mutex::new(None),
            upload_gate: Mutex::new(None),
            upload_started: Notify::new(),
        }
    }

    /// Return `entities` for every find on `entity_type`
    pub fn set_find_response(&self, entity_type: &str, entities: Vec<Entity>) {
        self.find_responses
            .lock()
            .unwrap()
            .insert(entity_type.to_string(), entities);
    }

    // === Error injection methods ===

    /// Make `find` return an error
    pub fn fail_find(&self, msg: &str) {
        *self.error_on_find.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create` return an error
    pub fn fail_create(&self, msg: &str) {
        *self.error_on_create.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `upload` return an error
    pub fn fail_upload(&self, msg: &str) {
        *self.error_on_upload.lock().unwrap() = Some(msg.to_string());
    }

    /// Block uploads until [`MockTrackingService::release_uploads`]
    pub fn hold_uploads(&self) {
        *self.upload_gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    /// Wait until an upload has been entered
    pub async fn upload_started(&self) {
        self.upload_started.notified().await;
    }

    /// Let held uploads finish
    pub fn release_uploads(&self) {
        if let Some(gate) = self.upload_gate.lock().unwrap().take() {
            gate.notify_waiters();
            gate.notify_one();
        }
    }

    // === Call verification methods ===

    /// All `find` calls
    pub fn get_find_calls(&self) -> Vec<FindCall> {
        self.find_calls.lock().unwrap().clone()
    }

    /// All `create` calls
    pub fn get_create_calls(&self) -> Vec<CreateCall> {
        self.create_calls.lock().unwrap().clone()
    }

    /// All `upload` calls
    pub fn get_upload_calls(&self) -> Vec<UploadCall> {
        self.upload_calls.lock().unwrap().clone()
    }

    /// Assert that exactly one Version was created
    pub fn assert_one_version_created(&self) -> CreateCall {
        let calls = self.get_create_calls();
        assert_eq!(calls.len(), 1, "Expected one create call but got: {calls:?}");
        assert_eq!(calls[0].entity_type, "Version");
        calls[0].clone()
    }
}

impl Default for MockTrackingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackingService for MockTrackingService {
    async fn find(&self, entity_type: &str, query: &Query) -> Result<Vec<Entity>> {
        self.find_calls.lock().unwrap().push(FindCall {
            entity_type: entity_type.to_string(),
            query: query.clone(),
        });

        // Check for injected error
        if let Some(msg) = self.error_on_find.lock().unwrap().as_ref() {
            return Err(Error::Tracking(msg.clone()));
        }

        let responses = self.find_responses.lock().unwrap();
        let mut found = responses.get(entity_type).cloned().unwrap_or_default();
        if let Some(limit) = query.limit {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn create(&self, entity_type: &str, data: RecordData) -> Result<Entity> {
        self.log.push("create");
        self.create_calls.lock().unwrap().push(CreateCall {
            entity_type: entity_type.to_string(),
            data: data.clone(),
        });

        // Check for injected error
        if let Some(msg) = self.error_on_create.lock().unwrap().as_ref() {
            return Err(Error::Tracking(msg.clone()));
        }

        Ok(Entity {
            entity_type: entity_type.to_string(),
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            fields: data,
        })
    }

    async fn upload(
        &self,
        entity_type: &str,
        entity_id: u64,
        path: &Path,
        field_name: &str,
    ) -> Result<()> {
        self.upload_started.notify_one();
        let gate = self.upload_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.log.push("upload");
        self.upload_calls.lock().unwrap().push(UploadCall {
            entity_type: entity_type.to_string(),
            entity_id,
            path: path.to_path_buf(),
            field_name: field_name.to_string(),
            file_existed: path.exists(),
            thread: std::thread::current().id(),
        });

        // Check for injected error
        if let Some(msg) = self.error_on_upload.lock().unwrap().as_ref() {
            return Err(Error::Tracking(msg.clone()));
        }
        Ok(())
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}
