//! Core types for review-upload

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Payload of a tracking-service record, keyed by field name
pub type RecordData = Map<String, Value>;

/// A reference to an entity in the tracking service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityRef {
    /// Entity type (e.g. "Shot", "Task")
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Entity id
    pub id: u64,
    /// Display name, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    /// Create a named entity reference
    pub fn new(entity_type: impl Into<String>, id: u64, name: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            id,
            name: Some(name.into()),
        }
    }

    /// Name or an empty string
    pub fn name_or_default(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// JSON form used when linking this entity from another record
    pub fn to_link(&self) -> Value {
        serde_json::json!({ "type": self.entity_type, "id": self.id })
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {name}", self.entity_type),
            None => write!(f, "{} #{}", self.entity_type, self.id),
        }
    }
}

/// The unit of work a review is submitted against
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Context {
    /// Project the work belongs to
    pub project: EntityRef,
    /// Linked entity (Shot, Asset, ...)
    #[serde(default)]
    pub entity: Option<EntityRef>,
    /// Pipeline step
    #[serde(default)]
    pub step: Option<EntityRef>,
    /// Task
    #[serde(default)]
    pub task: Option<EntityRef>,
}

impl Context {
    /// Task name, if the context has a named task
    pub fn task_name(&self) -> Option<&str> {
        self.task.as_ref().and_then(|t| t.name.as_deref())
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.task, &self.entity) {
            (Some(task), Some(entity)) => write!(f, "{task}, {entity}"),
            (None, Some(entity)) => write!(f, "{entity}"),
            (Some(task), None) => write!(f, "{task}"),
            (None, None) => write!(f, "{}", self.project),
        }
    }
}

/// A single publish field value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer field, e.g. `version`
    Int(i64),
    /// String field, e.g. `Shot`
    Str(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Named template slots used to render a publish path
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishFields(BTreeMap<String, FieldValue>);

impl PublishFields {
    /// Name of the slot the version resolver drives
    pub const VERSION: &'static str = "version";

    /// Create an empty field set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a string field
    pub fn insert_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), FieldValue::Str(value.into()));
    }

    /// Set an integer field
    pub fn insert_int(&mut self, key: impl Into<String>, value: i64) {
        self.0.insert(key.into(), FieldValue::Int(value));
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Current `version` value
    pub fn version(&self) -> Option<u32> {
        match self.0.get(Self::VERSION) {
            Some(FieldValue::Int(v)) => u32::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Set the `version` value
    pub fn set_version(&mut self, version: u32) {
        self.insert_int(Self::VERSION, i64::from(version));
    }

    /// Iterate fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PublishFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.insert_str(k, v);
        }
        fields
    }
}

/// A created tracking-service entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    /// Entity type
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Entity id
    pub id: u64,
    /// Returned fields
    #[serde(default)]
    pub fields: RecordData,
}

impl Entity {
    /// Read a string field
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// Read a linked entity field (`{"type", "id", "name"}`)
    pub fn link_field(&self, name: &str) -> Option<EntityRef> {
        self.fields
            .get(name)
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Reference to this entity, named from the given field
    pub fn to_ref(&self, name_field: &str) -> EntityRef {
        EntityRef {
            entity_type: self.entity_type.clone(),
            id: self.id,
            name: self.str_field(name_field).map(ToString::to_string),
        }
    }
}

/// A playlist a review can be added to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Playlist {
    /// Playlist id
    pub id: u64,
    /// Playlist code (name)
    pub code: String,
    /// Scheduled review time, if any
    pub date_and_time: Option<DateTime<FixedOffset>>,
}

/// What the artist fills in before submitting
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    /// Local media file to publish
    pub source: PathBuf,
    /// Version title; `{version}` is replaced by the resolved version
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Playlist to add the version to
    pub playlist_id: Option<u64>,
}

/// Everything resolved for one submission
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    /// Local media file being published
    pub source: PathBuf,
    /// Versioned publish path the file is copied to
    pub destination: PathBuf,
    /// Display title as entered; `{version}` slots are still unexpanded
    ///
    /// The Version record's code fills them in with the resolved version.
    pub title: String,
    /// Free-text description
    pub description: String,
    /// Playlist to add the version to
    pub playlist_id: Option<u64>,
    /// Fields the destination was rendered from
    pub fields: PublishFields,
}

/// A queued background upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadJob {
    /// Version record the media is attached to
    pub version_id: u64,
    /// Local file to upload and then remove
    pub file_path: PathBuf,
}
