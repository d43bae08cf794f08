//! Creation and upload event hooks

use crate::error::Result;
use crate::types::RecordData;
use tracing::info;

/// Notified around Version creation and media upload
///
/// All methods run on the task driving the submission, never on an upload
/// worker. Every method has a pass-through default.
pub trait EventsHook: Send + Sync {
    /// Called with the outgoing Version payload; the returned payload is
    /// what gets created
    fn before_version_creation(&self, data: RecordData) -> Result<RecordData> {
        Ok(data)
    }

    /// Called once the Version exists
    fn after_version_creation(&self, _version_id: u64) -> Result<()> {
        Ok(())
    }

    /// Called after the media upload finished successfully
    fn after_upload(&self, _version_id: u64) -> Result<()> {
        Ok(())
    }
}

/// Does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEvents;

impl EventsHook for DefaultEvents {}

/// Logs each event
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEvents;

impl EventsHook for LoggingEvents {
    fn before_version_creation(&self, data: RecordData) -> Result<RecordData> {
        info!(
            code = data.get("code").and_then(|v| v.as_str()).unwrap_or_default(),
            "Creating version"
        );
        Ok(data)
    }

    fn after_version_creation(&self, version_id: u64) -> Result<()> {
        info!(version_id, "Version created");
        Ok(())
    }

    fn after_upload(&self, version_id: u64) -> Result<()> {
        info!(version_id, "Review media uploaded");
        Ok(())
    }
}

/// Adds site-wide fields to every new Version
///
/// Fields already present in the payload win.
#[derive(Debug, Clone, Default)]
pub struct RecordDefaults {
    fields: RecordData,
}

impl RecordDefaults {
    /// Create from the fields to add
    pub const fn new(fields: RecordData) -> Self {
        Self { fields }
    }
}

impl EventsHook for RecordDefaults {
    fn before_version_creation(&self, mut data: RecordData) -> Result<RecordData> {
        for (key, value) in &self.fields {
            data.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Ok(data)
    }
}
