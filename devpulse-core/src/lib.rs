//! Core types and configuration for devpulse
//!
//! This crate provides the configuration schema and loader, the shared
//! error type, and logging initialization used by the agent and CLI crates.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
