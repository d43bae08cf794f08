//! Shared test support

#![allow(unused_imports)]

pub mod fixtures;
pub mod mock_tracking;

pub use fixtures::*;
pub use mock_tracking::*;
