//! Site customization hooks
//!
//! Two hook categories exist: [`SettingsHook`] controls naming, and
//! [`EventsHook`] is notified around record creation and upload. Sites pick
//! implementations by name in the config; [`HookRegistry`] resolves those
//! names once at startup.

mod events;
mod registry;
mod settings;

pub use events::{DefaultEvents, EventsHook, LoggingEvents, RecordDefaults};
pub use registry::{HookRegistry, HooksConfig};
pub use settings::{DefaultSettings, SettingsHook, format_title};

use std::sync::Arc;

/// The bound hook implementations for a session
#[derive(Clone)]
pub struct Hooks {
    /// Naming hook
    pub settings: Arc<dyn SettingsHook>,
    /// Creation/upload event hook
    pub events: Arc<dyn EventsHook>,
}

impl Hooks {
    /// Bundle explicit hook implementations
    pub fn new(settings: Arc<dyn SettingsHook>, events: Arc<dyn EventsHook>) -> Self {
        Self { settings, events }
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new(Arc::new(DefaultSettings), Arc::new(DefaultEvents))
    }
}
