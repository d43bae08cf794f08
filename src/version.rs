//! Publish version resolution
//!
//! Picks the version number a new review is published under, so that an
//! existing publish is never overwritten.

use crate::error::{Error, Result};
use crate::fs::Filesystem;
use crate::template::PathTemplate;
use crate::types::PublishFields;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Starting point of the descending probe
pub const PROBE_CEILING: u32 = 1000;

/// How the next version number is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VersionStrategy {
    /// Probe downward from 999 and publish one above the highest existing
    /// version (1 when nothing exists). Gaps below it are never reused.
    #[default]
    DescendingProbe,
    /// Publish to the lowest version whose path does not exist.
    FirstGap,
}

/// Resolve the next publish path
///
/// Returns the rendered path together with the fields it was rendered
/// from, `version` set to the chosen number.
pub fn next_publish_path(
    template: &dyn PathTemplate,
    mut fields: PublishFields,
    fs: &dyn Filesystem,
    strategy: VersionStrategy,
) -> Result<(PathBuf, PublishFields)> {
    let version = match strategy {
        VersionStrategy::DescendingProbe => descending_probe(template, &mut fields, fs)?,
        VersionStrategy::FirstGap => first_gap(template, &mut fields, fs)?,
    };

    fields.set_version(version);
    let path = template.apply_fields(&fields)?;

    if fs.exists(&path) {
        return Err(Error::VersionsExhausted { path });
    }

    debug!("Next publish version is {version}: {}", path.display());
    Ok((path, fields))
}

fn descending_probe(
    template: &dyn PathTemplate,
    fields: &mut PublishFields,
    fs: &dyn Filesystem,
) -> Result<u32> {
    let mut version = PROBE_CEILING;

    while version > 1 {
        let candidate = version - 1;
        fields.set_version(candidate);
        if fs.exists(&template.apply_fields(fields)?) {
            break;
        }
        version = candidate;
    }

    Ok(version)
}

fn first_gap(
    template: &dyn PathTemplate,
    fields: &mut PublishFields,
    fs: &dyn Filesystem,
) -> Result<u32> {
    for version in 1..u32::MAX {
        fields.set_version(version);
        let path = template.apply_fields(fields)?;
        if !fs.exists(&path) {
            return Ok(version);
        }
    }
    Err(Error::VersionsExhausted {
        path: template.apply_fields(fields)?,
    })
}
