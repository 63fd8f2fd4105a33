//! # VetWatch Common Library
//!
//! Shared code for the VetWatch services:
//! - Error type
//! - Configuration loading (TOML + environment)
//! - Event types and the broadcast EventBus

pub mod config;
pub mod error;
pub mod events;

pub use error::{Error, Result};
