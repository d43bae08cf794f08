//! review-upload - publish media for review
//!
//! Copies a local movie to a versioned publish location, creates a Version
//! record in the production-tracking site and uploads the media in the
//! background, with hooks around each step for site customization.

pub mod config;
pub mod error;
pub mod fs;
pub mod history;
pub mod hooks;
pub mod playlist;
pub mod session;
pub mod submit;
pub mod template;
pub mod tracking;
pub mod types;
pub mod version;
pub mod worker;
