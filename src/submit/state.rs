//! Submission state machine

use crate::error::{Error, Result};
use crate::worker::TaskId;
use std::fmt;

/// Coarse submission phase, used for transition rules and display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the user to submit
    Idle,
    /// Copying media and creating the record
    Submitting,
    /// The Version record exists
    RemoteRecordCreated,
    /// Media upload running in the background
    Uploading,
    /// Upload finished and hooks ran
    Complete,
    /// Submission stopped on an error
    Failed,
}

impl Phase {
    /// Whether the state machine allows `self → next`
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Submitting)
                | (Self::Submitting, Self::RemoteRecordCreated | Self::Failed)
                | (Self::RemoteRecordCreated, Self::Uploading | Self::Failed)
                | (Self::Uploading, Self::Complete | Self::Failed)
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::RemoteRecordCreated => "record created",
            Self::Uploading => "uploading",
            Self::Complete => "complete",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Where a submission is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    /// Waiting for the user to submit
    #[default]
    Idle,
    /// Copying media and creating the record
    Submitting,
    /// The Version record exists, upload not queued yet
    RemoteRecordCreated {
        /// Created Version
        version_id: u64,
    },
    /// Media upload running in the background
    Uploading {
        /// Created Version
        version_id: u64,
        /// Background task doing the upload
        task: TaskId,
    },
    /// Upload finished and hooks ran
    Complete {
        /// Created Version
        version_id: u64,
    },
    /// Submission stopped on an error
    Failed {
        /// User-facing message
        message: String,
    },
}

impl SubmissionState {
    /// Phase of this state
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Idle => Phase::Idle,
            Self::Submitting => Phase::Submitting,
            Self::RemoteRecordCreated { .. } => Phase::RemoteRecordCreated,
            Self::Uploading { .. } => Phase::Uploading,
            Self::Complete { .. } => Phase::Complete,
            Self::Failed { .. } => Phase::Failed,
        }
    }

    /// Failed state with the standard user-facing wording
    pub fn failed(reason: impl fmt::Display) -> Self {
        Self::Failed {
            message: format!("An error was reported: {reason}"),
        }
    }

    /// No further transitions possible
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Failed { .. })
    }

    /// The created Version, once there is one
    pub const fn version_id(&self) -> Option<u64> {
        match self {
            Self::RemoteRecordCreated { version_id }
            | Self::Uploading { version_id, .. }
            | Self::Complete { version_id } => Some(*version_id),
            _ => None,
        }
    }

    /// Move to `next` if the state machine allows it
    pub fn advance(&mut self, next: Self) -> Result<()> {
        if !self.phase().can_advance_to(next.phase()) {
            return Err(Error::InvalidTransition {
                from: self.phase().to_string(),
                to: next.phase().to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { message } => f.write_str(message),
            other => write!(f, "{}", other.phase()),
        }
    }
}
