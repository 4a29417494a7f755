//! Heartbeat agents for devpulse
//!
//! One [`HeartbeatAgent`] per account drives the device lifecycle against
//! the rewards API: toggle on, periodic heartbeats, earnings polling, and a
//! best-effort toggle off at shutdown. The [`FleetDriver`] builds and runs
//! one agent per configured account.

pub mod agent;
pub mod client;
pub mod fleet;

pub use agent::{AgentState, HeartbeatAgent, WHITELISTED_URLS};
pub use client::{ApiClient, ApiError, ApiResult, DeviceState, WalletDetails};
pub use fleet::FleetDriver;
