//! Publish fields and record payload
//!
//! Works out which template a context publishes through, the fields that
//! fill it, and the Version payload sent to the tracking site.

use crate::error::{Error, Result};
use crate::hooks::{SettingsHook, format_title};
use crate::template::{TemplatePath, TemplateSet};
use crate::tracking::{Filter, TrackingService};
use crate::types::{Context, Entity, EntityRef, PublishFields, RecordData, SubmissionRequest};
use serde_json::{Value, json};
use tracing::debug;

/// Template and fields for a context, version not yet chosen
#[derive(Debug, Clone)]
pub struct PublishTarget {
    /// Template the review is published through
    pub template: TemplatePath,
    /// Fields filling every slot except `version`
    pub fields: PublishFields,
}

/// Collect publish fields for `context`
///
/// Shots publish through the shot template with their sequence; anything
/// else is treated as an asset and publishes with its asset type.
pub async fn gather_publish_fields(
    service: &dyn TrackingService,
    context: &Context,
    settings: &dyn SettingsHook,
    templates: &TemplateSet,
) -> Result<PublishTarget> {
    let entity = context
        .entity
        .as_ref()
        .ok_or(Error::IncompleteContext("entity"))?;
    let step = context
        .step
        .as_ref()
        .ok_or(Error::IncompleteContext("step"))?;
    let task = context
        .task
        .as_ref()
        .ok_or(Error::IncompleteContext("task"))?;

    let mut fields = PublishFields::new();
    fields.insert_str("Step", step.name_or_default());
    fields.insert_str("Task", task.name_or_default());
    fields.insert_str("timestamp", settings.get_timestamp(context));

    let template = if entity.entity_type == "Shot" {
        let shot = find_entity(service, entity, &["sg_sequence"]).await?;
        let sequence = shot
            .link_field("sg_sequence")
            .and_then(|s| s.name)
            .ok_or_else(|| Error::Tracking(format!("{entity} has no sequence")))?;
        fields.insert_str("Sequence", sequence);
        fields.insert_str("Shot", entity.name_or_default());
        templates.shot()?
    } else {
        let asset = find_entity(service, entity, &["sg_asset_type"]).await?;
        let asset_type = asset
            .str_field("sg_asset_type")
            .ok_or_else(|| Error::Tracking(format!("{entity} has no asset type")))?;
        fields.insert_str("Asset_Type", asset_type);
        fields.insert_str("Asset", entity.name_or_default());
        templates.asset()?
    };

    debug!("Publishing {entity} through {}", template.name());
    Ok(PublishTarget { template, fields })
}

async fn find_entity(
    service: &dyn TrackingService,
    entity: &EntityRef,
    fields: &[&str],
) -> Result<Entity> {
    service
        .find_one(&entity.entity_type, vec![Filter::is("id", entity.id)], fields)
        .await?
        .ok_or_else(|| Error::EntityNotFound {
            entity_type: entity.entity_type.clone(),
            id: entity.id,
        })
}

/// Version payload for a resolved request
///
/// `user` is recorded as both creator and artist when known.
pub fn build_version_data(
    context: &Context,
    request: &SubmissionRequest,
    user: Option<&EntityRef>,
) -> RecordData {
    let version = request.fields.version().unwrap_or_default();
    let link = |e: Option<&EntityRef>| e.map_or(Value::Null, EntityRef::to_link);

    let mut data = RecordData::new();
    data.insert("code".into(), json!(format_title(&request.title, version)));
    data.insert("description".into(), json!(request.description));
    data.insert("project".into(), context.project.to_link());
    data.insert("entity".into(), link(context.entity.as_ref()));
    data.insert("sg_task".into(), link(context.task.as_ref()));
    if let Some(user) = user {
        data.insert("created_by".into(), user.to_link());
        data.insert("user".into(), user.to_link());
    }
    data.insert(
        "sg_path_to_movie".into(),
        Value::String(request.destination.to_string_lossy().into_owned()),
    );
    if let Some(playlist_id) = request.playlist_id {
        data.insert(
            "playlists".into(),
            json!([{ "type": "Playlist", "id": playlist_id }]),
        );
    }
    data
}
