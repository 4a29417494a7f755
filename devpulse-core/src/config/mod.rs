//! Configuration management
//!
//! Handles loading of the devpulse configuration directory: `config.json`
//! (optional overrides), `accounts.json` (required) and `proxies.txt`
//! (optional).

pub mod loader;
pub mod schema;
pub mod validate;

pub use loader::ConfigLoader;
pub use schema::*;
