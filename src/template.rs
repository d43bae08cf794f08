//! Publish path templates
//!
//! A template is a relative path pattern with named slots, joined onto a
//! project root. Slots are written `{Key}`; integer slots can request zero
//! padding with `{version:03}`.

use crate::error::{Error, Result};
use crate::types::{FieldValue, PublishFields};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Anything that can turn publish fields into a path
pub trait PathTemplate: Send + Sync {
    /// Render the path for the given fields
    fn apply_fields(&self, fields: &PublishFields) -> Result<PathBuf>;
}

impl<F> PathTemplate for F
where
    F: Fn(&PublishFields) -> Result<PathBuf> + Send + Sync,
{
    fn apply_fields(&self, fields: &PublishFields) -> Result<PathBuf> {
        self(fields)
    }
}

/// Whether a string field renders as exactly one path component
fn is_single_component(value: &str) -> bool {
    !value.contains(['/', '\\']) && value != "." && value != ".."
}

fn slot_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)(?::0?(\d+))?\}")
            .expect("hardcoded slot pattern is valid")
    })
}

/// A parsed slot in a template pattern
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot {
    key: String,
    width: Option<usize>,
}

/// A named path template rooted at a directory
#[derive(Debug, Clone)]
pub struct TemplatePath {
    name: String,
    root: PathBuf,
    pattern: String,
    slots: Vec<Slot>,
}

impl TemplatePath {
    /// Parse a template pattern
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>, pattern: &str) -> Result<Self> {
        let name = name.into();
        if pattern.is_empty() {
            return Err(Error::Template(format!("template {name} is empty")));
        }
        if Path::new(pattern).is_absolute() {
            return Err(Error::Template(format!(
                "template {name} must be relative to the project root"
            )));
        }

        let stray = slot_regex().replace_all(pattern, "");
        if stray.contains('{') || stray.contains('}') {
            return Err(Error::Template(format!(
                "template {name} has an unbalanced or malformed slot: {pattern}"
            )));
        }

        let slots = slot_regex()
            .captures_iter(pattern)
            .map(|c| Slot {
                key: c[1].to_string(),
                width: c.get(2).and_then(|w| w.as_str().parse().ok()),
            })
            .collect();

        Ok(Self {
            name,
            root: root.into(),
            pattern: pattern.to_string(),
            slots,
        })
    }

    /// Template name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys referenced by the pattern, in order of appearance
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|s| s.key.as_str())
    }

    /// Whether the pattern references the given key
    pub fn has_key(&self, key: &str) -> bool {
        self.slots.iter().any(|s| s.key == key)
    }
}

impl PathTemplate for TemplatePath {
    fn apply_fields(&self, fields: &PublishFields) -> Result<PathBuf> {
        let mut missing = None;
        let mut escaping = None;
        let rendered = slot_regex().replace_all(&self.pattern, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            let width = caps.get(2).and_then(|w| w.as_str().parse::<usize>().ok());
            match fields.get(key) {
                Some(FieldValue::Int(v)) => match width {
                    Some(w) => format!("{v:0w$}"),
                    None => v.to_string(),
                },
                Some(FieldValue::Str(s)) => {
                    if !is_single_component(s) {
                        escaping.get_or_insert_with(|| (key.to_string(), s.clone()));
                    }
                    s.clone()
                }
                None => {
                    missing.get_or_insert_with(|| key.to_string());
                    String::new()
                }
            }
        });

        if let Some(key) = missing {
            return Err(Error::Template(format!(
                "template {} is missing field {key}",
                self.name
            )));
        }
        if let Some((key, value)) = escaping {
            return Err(Error::Template(format!(
                "template {} field {key} value {value:?} is not a single path component",
                self.name
            )));
        }

        Ok(self.root.join(rendered.as_ref()))
    }
}

/// The publish templates a site configures, keyed by their role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateSet {
    /// Root directory every template is joined onto
    pub root: PathBuf,
    /// Review movie location for shots
    pub shot_review_mov_publish: String,
    /// Review movie location for assets
    pub asset_review_mov_publish: String,
}

impl Default for TemplateSet {
    fn default() -> Self {
        Self {
            root: PathBuf::from("publish"),
            shot_review_mov_publish:
                "sequences/{Sequence}/{Shot}/{Step}/review/{Shot}_{Task}_{timestamp}_v{version:03}.mov"
                    .to_string(),
            asset_review_mov_publish:
                "assets/{Asset_Type}/{Asset}/{Step}/review/{Asset}_{Task}_{timestamp}_v{version:03}.mov"
                    .to_string(),
        }
    }
}

impl TemplateSet {
    /// Template used for shot reviews
    pub fn shot(&self) -> Result<TemplatePath> {
        TemplatePath::new(
            "shot_review_mov_publish",
            &self.root,
            &self.shot_review_mov_publish,
        )
    }

    /// Template used for asset (and any non-shot) reviews
    pub fn asset(&self) -> Result<TemplatePath> {
        TemplatePath::new(
            "asset_review_mov_publish",
            &self.root,
            &self.asset_review_mov_publish,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> PublishFields {
        let mut fields: PublishFields = [("Shot", "sh010"), ("Task", "comp")].into_iter().collect();
        fields.set_version(7);
        fields
    }

    #[test]
    fn test_render_pads_version() {
        let t = TemplatePath::new("t", "/proj", "{Shot}/{Shot}_{Task}_v{version:03}.mov").unwrap();
        let path = t.apply_fields(&fields()).unwrap();
        assert_eq!(path, PathBuf::from("/proj/sh010/sh010_comp_v007.mov"));
    }

    #[test]
    fn test_render_unpadded_int() {
        let t = TemplatePath::new("t", "/proj", "v{version}.mov").unwrap();
        assert_eq!(t.apply_fields(&fields()).unwrap(), PathBuf::from("/proj/v7.mov"));
    }

    #[test]
    fn test_missing_field_is_error() {
        let t = TemplatePath::new("t", "/proj", "{Sequence}/{Shot}.mov").unwrap();
        let err = t.apply_fields(&fields()).unwrap_err();
        assert!(err.to_string().contains("Sequence"));
    }

    #[test]
    fn test_malformed_slot_rejected() {
        assert!(TemplatePath::new("t", "/proj", "{Shot/v{version}.mov").is_err());
        assert!(TemplatePath::new("t", "/proj", "{1abc}.mov").is_err());
    }

    #[test]
    fn test_field_cannot_leave_its_directory() {
        let t = TemplatePath::new("t", "/proj", "{Shot}/{Shot}_{Task}.mov").unwrap();
        for bad in ["..", ".", "../../etc", "sq01/sh010", "sh\\010"] {
            let mut f = fields();
            f.insert_str("Shot", bad);
            let err = t.apply_fields(&f).unwrap_err();
            assert!(matches!(err, Error::Template(_)), "{bad} was accepted");
            assert!(err.to_string().contains("Shot"));
        }

        let mut f = fields();
        f.insert_str("Shot", "sh010..v2");
        assert_eq!(
            t.apply_fields(&f).unwrap(),
            PathBuf::from("/proj/sh010..v2/sh010..v2_comp.mov")
        );
    }

    #[test]
    fn test_absolute_pattern_rejected() {
        assert!(TemplatePath::new("t", "/proj", "/abs/{Shot}.mov").is_err());
    }

    #[test]
    fn test_keys() {
        let t = TemplatePath::new("t", "/proj", "{Shot}/{Task}_v{version:03}").unwrap();
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["Shot", "Task", "version"]);
        assert!(t.has_key("version"));
        assert!(!t.has_key("Asset"));
    }

    #[test]
    fn test_default_templates_parse() {
        let set = TemplateSet::default();
        assert!(set.shot().unwrap().has_key("version"));
        assert!(set.asset().unwrap().has_key("Asset_Type"));
    }
}
