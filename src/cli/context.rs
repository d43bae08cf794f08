//! Context command - show what a task belongs to

use crate::cli::connect;
use crate::cli::style::{Stylize, rail};
use anstream::println;
use review_upload::error::Result;
use review_upload::tracking::context_from_task;
use review_upload::types::EntityRef;
use std::path::Path;

/// Run the context command
pub async fn run_context(config_path: Option<&Path>, task: u64) -> Result<()> {
    let (_, service) = connect(config_path)?;
    let context = context_from_task(service.as_ref(), task).await?;

    println!("{}", context.to_string().heading());
    print_entry("Project", Some(&context.project));
    print_entry("Entity", context.entity.as_ref());
    print_entry("Step", context.step.as_ref());
    print_entry("Task", context.task.as_ref());
    Ok(())
}

fn print_entry(label: &str, entity: Option<&EntityRef>) {
    match entity {
        Some(e) => println!(
            "{} {:<8} {} {}",
            rail(),
            label,
            e.name_or_default().highlight(),
            format!("{} #{}", e.entity_type, e.id).detail()
        ),
        None => println!("{} {:<8} {}", rail(), label, "-".detail()),
    }
}
