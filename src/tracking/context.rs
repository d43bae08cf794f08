//! Building a context from tracking data

use crate::error::{Error, Result};
use crate::tracking::{Filter, TrackingService};
use crate::types::{Context, EntityRef};
use tracing::{debug, warn};

/// Look up a task and build the context it belongs to
pub async fn context_from_task(service: &dyn TrackingService, task_id: u64) -> Result<Context> {
    let task = service
        .find_one(
            "Task",
            vec![Filter::is("id", task_id)],
            &["content", "project", "entity", "step"],
        )
        .await?
        .ok_or_else(|| Error::EntityNotFound {
            entity_type: "Task".to_string(),
            id: task_id,
        })?;

    let project = task
        .link_field("project")
        .ok_or(Error::IncompleteContext("project"))?;

    let context = Context {
        project,
        entity: task.link_field("entity"),
        step: task.link_field("step"),
        task: Some(task.to_ref("content")),
    };
    debug!("Resolved task {task_id} to context {context}");
    Ok(context)
}

/// Look up a user by login
pub async fn user_by_login(service: &dyn TrackingService, login: &str) -> Result<Option<EntityRef>> {
    let user = service
        .find_one("HumanUser", vec![Filter::is("login", login)], &["login", "name"])
        .await?;
    if user.is_none() {
        warn!("No user with login {login}, versions will have no creator");
    }
    Ok(user.map(|u| u.to_ref("name")))
}
