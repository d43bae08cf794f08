//! Binding hook names from config to implementations

use crate::error::{Error, Result};
use crate::hooks::{
    DefaultEvents, DefaultSettings, EventsHook, Hooks, LoggingEvents, RecordDefaults,
    SettingsHook,
};
use crate::types::RecordData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Hook selection in the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HooksConfig {
    /// Name of the settings hook
    pub settings: String,
    /// Name of the events hook
    pub events: String,
    /// Fields added by the `record-defaults` events hook
    pub record_defaults: RecordData,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            settings: "default".to_string(),
            events: "default".to_string(),
            record_defaults: RecordData::new(),
        }
    }
}

type SettingsFactory = Box<dyn Fn(&HooksConfig) -> Arc<dyn SettingsHook> + Send + Sync>;
type EventsFactory = Box<dyn Fn(&HooksConfig) -> Arc<dyn EventsHook> + Send + Sync>;

/// Named hook implementations
///
/// Starts with the built-ins; embedders register their own before calling
/// [`HookRegistry::bind`].
pub struct HookRegistry {
    settings: BTreeMap<String, SettingsFactory>,
    events: BTreeMap<String, EventsFactory>,
}

impl Default for HookRegistry {
    fn default() -> Self {
        let mut registry = Self {
            settings: BTreeMap::new(),
            events: BTreeMap::new(),
        };
        registry.register_settings("default", |_| Arc::new(DefaultSettings));
        registry.register_events("default", |_| Arc::new(DefaultEvents));
        registry.register_events("logging", |_| Arc::new(LoggingEvents));
        registry.register_events("record-defaults", |config| {
            Arc::new(RecordDefaults::new(config.record_defaults.clone()))
        });
        registry
    }
}

impl HookRegistry {
    /// Register a settings hook under `name`, replacing any previous one
    pub fn register_settings<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&HooksConfig) -> Arc<dyn SettingsHook> + Send + Sync + 'static,
    {
        self.settings.insert(name.to_string(), Box::new(factory));
    }

    /// Register an events hook under `name`, replacing any previous one
    pub fn register_events<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&HooksConfig) -> Arc<dyn EventsHook> + Send + Sync + 'static,
    {
        self.events.insert(name.to_string(), Box::new(factory));
    }

    /// Resolve the configured names
    pub fn bind(&self, config: &HooksConfig) -> Result<Hooks> {
        let settings = self.settings.get(&config.settings).ok_or_else(|| {
            Error::Config(format!(
                "unknown settings hook '{}' (available: {})",
                config.settings,
                join_names(self.settings.keys())
            ))
        })?;
        let events = self.events.get(&config.events).ok_or_else(|| {
            Error::Config(format!(
                "unknown events hook '{}' (available: {})",
                config.events,
                join_names(self.events.keys())
            ))
        })?;

        debug!(
            settings = %config.settings,
            events = %config.events,
            "Binding hooks"
        );
        Ok(Hooks::new(settings(config), events(config)))
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a String>) -> String {
    names.map(String::as_str).collect::<Vec<_>>().join(", ")
}
