//! Naming hook

use crate::types::Context;
use chrono::Local;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Placeholder replaced by the resolved version in titles
const VERSION_SLOT: &str = "{version}";

/// Padding used by a bare `{version}`
const DEFAULT_VERSION_WIDTH: usize = 3;

fn version_slot_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{version(?::0?(\d+))?\}").expect("hardcoded version slot pattern is valid")
    })
}

/// Controls review titles and path timestamps
pub trait SettingsHook: Send + Sync {
    /// Default title for a new version
    ///
    /// May contain `{version}`, replaced by the version number padded to
    /// three digits once the publish path is resolved. `{version:0N}`
    /// pads to `N` digits instead, the same way path templates do.
    fn get_title(&self, context: &Context) -> String;

    /// Value of the `timestamp` publish field
    fn get_timestamp(&self, context: &Context) -> String;
}

/// Date-based naming: `v{version}_<task>_review`, timestamp `YYYYMMDD`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSettings;

impl SettingsHook for DefaultSettings {
    fn get_title(&self, context: &Context) -> String {
        match context.task_name() {
            Some(task) => format!("v{VERSION_SLOT}_{task}_review"),
            None => format!("v{VERSION_SLOT}_review"),
        }
    }

    fn get_timestamp(&self, _context: &Context) -> String {
        Local::now().format("%Y%m%d").to_string()
    }
}

/// Fill the `{version}` and `{version:0N}` slots of a title
pub fn format_title(title: &str, version: u32) -> String {
    version_slot_regex()
        .replace_all(title, |caps: &Captures<'_>| {
            let width = caps
                .get(1)
                .and_then(|w| w.as_str().parse().ok())
                .unwrap_or(DEFAULT_VERSION_WIDTH);
            format!("{version:0width$}")
        })
        .into_owned()
}
