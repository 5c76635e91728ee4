//! Integration test utilities for the SafeChat API
//!
//! Boots the full router over an in-process store and drives it over HTTP.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
