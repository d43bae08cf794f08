//! Configuration
//!
//! Read from `<config dir>/review-upload/config.json` (or an explicit
//! path), then overridden from the environment:
//!
//! - `REVIEW_UPLOAD_SITE_URL`: site address
//! - `SG_ACCESS_TOKEN`: API bearer token

use crate::error::{Error, Result};
use crate::hooks::HooksConfig;
use crate::template::TemplateSet;
use crate::version::VersionStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Directory name under the platform config/data dirs
pub const APP_DIR: &str = "review-upload";

/// Environment variable overriding the site address
pub const SITE_URL_ENV: &str = "REVIEW_UPLOAD_SITE_URL";

/// Environment variable holding the API token
pub const TOKEN_ENV: &str = "SG_ACCESS_TOKEN";

/// Settings for a review-upload session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Tracking site address
    pub site_url: Option<Url>,
    /// API bearer token
    pub access_token: Option<String>,
    /// Login of the submitting user, recorded as the version's creator
    pub user_login: Option<String>,
    /// Publish templates
    pub templates: TemplateSet,
    /// Hook selection
    pub hooks: HooksConfig,
    /// Concurrent background tasks
    pub max_threads: usize,
    /// Version numbering
    pub version_strategy: VersionStrategy,
    /// Whether the tracking panel app is installed, enabling "jump to panel"
    pub panel_app: bool,
    /// Number of playlists offered
    pub playlist_limit: u32,
    /// Where recent contexts are stored
    pub history_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            site_url: None,
            access_token: None,
            user_login: None,
            templates: TemplateSet::default(),
            hooks: HooksConfig::default(),
            max_threads: 2,
            version_strategy: VersionStrategy::default(),
            panel_app: false,
            playlist_limit: 10,
            history_path: None,
        }
    }
}

impl AppConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load config from `path`, or from the default location when `None`
    ///
    /// An explicit path must exist; a missing default file yields the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::read(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        debug!("Reading config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| Error::Filesystem {
            op: "read config",
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Parse config JSON
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply environment overrides using `lookup` to read variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(site) = lookup(SITE_URL_ENV).filter(|s| !s.is_empty()) {
            let url = Url::parse(&site)
                .map_err(|e| Error::Config(format!("{SITE_URL_ENV}={site}: {e}")))?;
            self.site_url = Some(url);
        }
        if let Some(token) = lookup(TOKEN_ENV).filter(|s| !s.is_empty()) {
            self.access_token = Some(token);
        }
        Ok(())
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.max_threads == 0 {
            return Err(Error::Config("max_threads must be at least 1".to_string()));
        }
        if self.playlist_limit == 0 {
            return Err(Error::Config("playlist_limit must be at least 1".to_string()));
        }
        self.templates.shot()?;
        self.templates.asset()?;
        Ok(())
    }

    /// Site address, required to talk to the tracking service
    pub fn site_url(&self) -> Result<&Url> {
        self.site_url.as_ref().ok_or_else(|| {
            Error::Config(format!("site_url is not set (config file or {SITE_URL_ENV})"))
        })
    }

    /// API token, required to talk to the tracking service
    pub fn access_token(&self) -> Result<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            Error::Config(format!("no access token (config file or {TOKEN_ENV})"))
        })
    }

    /// Where recent contexts are stored, if anywhere
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_path.clone().or_else(|| {
            dirs::data_dir().map(|dir| dir.join(APP_DIR).join("recent_contexts.json"))
        })
    }
}
