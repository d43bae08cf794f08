//! Playlists a review can be added to
//!
//! Offers the most recently updated playlists of the project whose review
//! date is unset or still ahead.

use crate::error::Result;
use crate::tracking::{Filter, Query, TrackingService};
use crate::types::{Entity, EntityRef, Playlist};
use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use serde_json::Value;
use std::fmt::Display;
use tracing::{debug, warn};

/// Caption of the "no playlist" entry
pub const NO_PLAYLIST_CAPTION: &str = "Add to playlist";

/// Playlist field holding the review date
const DATE_FIELD: &str = "sg_date_and_time";

/// One entry of the playlist selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistChoice {
    /// Text shown to the user
    pub caption: String,
    /// Playlist id, `None` for "no playlist"
    pub id: Option<u64>,
}

/// Fetch upcoming playlists for `project`, most recently updated first
pub async fn recent_playlists<Tz>(
    service: &dyn TrackingService,
    project: &EntityRef,
    now: &DateTime<Tz>,
    limit: u32,
) -> Result<Vec<Playlist>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let query = Query::new(vec![
        Filter::is("project", project.to_link()),
        Filter::Any(vec![
            Filter::greater_than(DATE_FIELD, now.to_rfc3339()),
            Filter::is(DATE_FIELD, Value::Null),
        ]),
    ])
    .fields(&["code", "id", DATE_FIELD])
    .order_desc("updated_at")
    .limit(limit);

    let entities = service.find("Playlist", &query).await?;
    debug!("Found {} playlists for {project}", entities.len());
    Ok(entities.iter().map(to_playlist).collect())
}

fn to_playlist(entity: &Entity) -> Playlist {
    let date_and_time = entity.str_field(DATE_FIELD).and_then(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .inspect_err(|e| warn!("Playlist {} has unreadable date {raw}: {e}", entity.id))
            .ok()
    });
    Playlist {
        id: entity.id,
        code: entity.str_field("code").unwrap_or_default().to_string(),
        date_and_time,
    }
}

/// Selector entries: "no playlist" first, then one per playlist
pub fn playlist_choices<Tz>(playlists: &[Playlist], now: &DateTime<Tz>) -> Vec<PlaylistChoice>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    std::iter::once(PlaylistChoice {
        caption: NO_PLAYLIST_CAPTION.to_string(),
        id: None,
    })
    .chain(playlists.iter().map(|p| PlaylistChoice {
        caption: playlist_caption(p, now),
        id: Some(p.id),
    }))
    .collect()
}

/// `code`, or `code (when)` for scheduled playlists
pub fn playlist_caption<Tz>(playlist: &Playlist, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match &playlist.date_and_time {
        Some(when) => format!("{} ({})", playlist.code, format_timestamp(when, now)),
        None => playlist.code.clone(),
    }
}

/// Short human form of a review time relative to `now`
///
/// `Today 01:37PM`, `Tomorrow 01:37PM`, otherwise `24 Jun 01:37PM`.
pub fn format_timestamp<Tz>(when: &DateTime<FixedOffset>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let local = when.with_timezone(&now.timezone());
    let tomorrow = now.clone() + Duration::hours(24);

    if local.date_naive() == now.date_naive() {
        local.format("Today %I:%M%p").to_string()
    } else if local.date_naive() == tomorrow.date_naive() {
        local.format("Tomorrow %I:%M%p").to_string()
    } else {
        local.format("%d %b %I:%M%p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_format_today() {
        let now = at("2024-06-24T09:00:00+02:00");
        assert_eq!(format_timestamp(&at("2024-06-24T13:37:00+02:00"), &now), "Today 01:37PM");
    }

    #[test]
    fn test_format_tomorrow() {
        let now = at("2024-06-24T09:00:00+02:00");
        assert_eq!(
            format_timestamp(&at("2024-06-25T01:37:00+02:00"), &now),
            "Tomorrow 01:37AM"
        );
    }

    #[test]
    fn test_format_later_date() {
        let now = at("2024-06-20T09:00:00+02:00");
        assert_eq!(format_timestamp(&at("2024-06-24T01:37:00+02:00"), &now), "24 Jun 01:37AM");
    }

    #[test]
    fn test_format_converts_to_local_offset() {
        // 23:30 UTC is already the next day at +02:00
        let now = at("2024-06-24T09:00:00+02:00");
        assert_eq!(
            format_timestamp(&at("2024-06-24T23:30:00+00:00"), &now),
            "Tomorrow 01:30AM"
        );
    }

    #[test]
    fn test_choices_start_with_no_playlist() {
        let now = at("2024-06-24T09:00:00+00:00");
        let playlists = vec![
            Playlist {
                id: 5,
                code: "dailies".to_string(),
                date_and_time: Some(at("2024-06-24T17:00:00+00:00")),
            },
            Playlist {
                id: 6,
                code: "backlog".to_string(),
                date_and_time: None,
            },
        ];

        let choices = playlist_choices(&playlists, &now);

        assert_eq!(choices.len(), 3);
        assert_eq!(choices[0].caption, NO_PLAYLIST_CAPTION);
        assert_eq!(choices[0].id, None);
        assert_eq!(choices[1].caption, "dailies (Today 05:00PM)");
        assert_eq!(choices[1].id, Some(5));
        assert_eq!(choices[2].caption, "backlog");
    }
}
