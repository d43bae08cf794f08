//! Playlists command - list playlists a review can be added to

use crate::cli::connect;
use crate::cli::style::{Stylize, list_item};
use anstream::println;
use chrono::Local;
use review_upload::error::Result;
use review_upload::playlist::{playlist_caption, recent_playlists};
use review_upload::types::EntityRef;
use std::path::Path;

/// Run the playlists command
pub async fn run_playlists(config_path: Option<&Path>, project: u64) -> Result<()> {
    let (config, service) = connect(config_path)?;
    let project = EntityRef {
        entity_type: "Project".to_string(),
        id: project,
        name: None,
    };
    let now = Local::now();

    let playlists =
        recent_playlists(service.as_ref(), &project, &now, config.playlist_limit).await?;
    if playlists.is_empty() {
        println!("{}", "No upcoming playlists".detail());
        return Ok(());
    }
    for playlist in &playlists {
        println!(
            "{} {} {}",
            list_item(),
            playlist_caption(playlist, &now),
            format!("#{}", playlist.id).detail()
        );
    }
    Ok(())
}
