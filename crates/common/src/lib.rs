//! Shared error definitions used across the skillsync crates.

pub mod error;

pub use error::{Error, FromMessage, Result};
