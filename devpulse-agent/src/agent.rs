//! Per-account heartbeat agent
//!
//! Owns one account's device lifecycle: the opening ON toggle, the recurring
//! heartbeat cycle, earnings polling, and the best-effort OFF toggle at
//! shutdown. Every remote call is independently wrapped; one failed call
//! never stops the cycle.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use devpulse_core::config::Account;
use devpulse_core::Error;

use crate::client::{ApiClient, ApiResult, DeviceState, HeartbeatEvent};

/// Domains reported to the heartbeat endpoint as the extension whitelist
pub const WHITELISTED_URLS: [&str; 2] = ["https://www.aeropres.in", "https://aeropres.in"];

/// Ticks between cosmetic wake-up notices
const WAKE_NOTICE_EVERY: u64 = 5;

/// Mutable per-agent state, mutated only by the agent's own cycle task
#[derive(Debug, Clone)]
pub struct AgentState {
    /// Whether the device is currently reported online
    pub device_on: bool,
    /// Completed cycle ticks
    pub uptime_minutes: u64,
    /// Always true; part of the fixed heartbeat payload
    pub is_installed: bool,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            device_on: false,
            uptime_minutes: 0,
            is_installed: true,
        }
    }
}

/// Estimated session earnings for the current uptime
pub fn estimate_session_earnings(uptime_minutes: u64, active_rate_per_minute: f64) -> f64 {
    uptime_minutes as f64 * active_rate_per_minute
}

/// Drives one account against the rewards API
pub struct HeartbeatAgent {
    inner: Arc<AgentInner>,
    cycle_interval: Duration,
    cancel: CancellationToken,
    task: RwLock<Option<JoinHandle<()>>>,
}

impl HeartbeatAgent {
    /// Create a new agent for an account with an already-built client
    pub fn new(account: Account, client: ApiClient, cycle_interval: Duration) -> Self {
        Self {
            inner: Arc::new(AgentInner {
                account,
                client,
                state: RwLock::new(AgentState::default()),
            }),
            cycle_interval,
            cancel: CancellationToken::new(),
            task: RwLock::new(None),
        }
    }

    pub fn wallet_address(&self) -> &str {
        &self.inner.account.wallet_address
    }

    /// Snapshot of the agent's mutable state
    pub async fn state(&self) -> AgentState {
        self.inner.state.read().await.clone()
    }

    /// Issue a device state-change request
    pub async fn toggle_device(&self, target: DeviceState) -> ApiResult<Value> {
        self.inner.toggle_device(target).await
    }

    /// Emit one heartbeat event
    pub async fn send_heartbeat(&self) -> ApiResult<Value> {
        self.inner.send_heartbeat().await
    }

    /// Poll wallet details and log the earnings report
    pub async fn report_earnings(&self) -> ApiResult<f64> {
        self.inner.report_earnings().await
    }

    /// Execute one cycle tick
    ///
    /// Exposed so tests can drive ticks deterministically; [`start`] runs
    /// this on the recurring interval.
    ///
    /// [`start`]: HeartbeatAgent::start
    pub async fn run_cycle(&self) -> devpulse_core::Result<()> {
        self.inner.run_cycle().await
    }

    /// Perform the opening toggle/heartbeat and start the recurring cycle
    pub async fn start(&self) {
        {
            let task_guard = self.task.read().await;
            if task_guard.is_some() {
                debug!("[{}] agent already started", self.wallet_address());
                return;
            }
        }

        let _ = self.inner.toggle_device(DeviceState::On).await;
        let _ = self.inner.send_heartbeat().await;

        let inner = Arc::clone(&self.inner);
        let cancel = self.cancel.clone();
        let period = self.cycle_interval;

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            // Ticks are serialized: the loop awaits each cycle body, and a
            // body running past the period skips to the next boundary.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // interval fires immediately; the opening toggle/heartbeat
            // already happened, so consume the first tick.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = inner.run_cycle().await {
                            error!("[{}] cycle error, marking device off: {}",
                                inner.account.wallet_address, e);
                            inner.state.write().await.device_on = false;
                        }
                    }
                }
            }
        });

        *self.task.write().await = Some(task);
        info!(
            "[{}] heartbeat cycle started (every {}s)",
            self.wallet_address(),
            self.cycle_interval.as_secs()
        );
    }

    /// Stop the cycle and issue one best-effort OFF toggle
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(task) = self.task.write().await.take() {
            let _ = task.await;
        }

        if let Err(e) = self.inner.toggle_device(DeviceState::Off).await {
            warn!(
                "[{}] final OFF toggle failed: {}",
                self.wallet_address(),
                e
            );
        }
        info!("[{}] agent stopped", self.wallet_address());
    }
}

/// Shared between the agent handle and its spawned cycle task
struct AgentInner {
    account: Account,
    client: ApiClient,
    state: RwLock<AgentState>,
}

impl AgentInner {
    async fn toggle_device(&self, target: DeviceState) -> ApiResult<Value> {
        match self
            .client
            .toggle(&self.account.wallet_address, target, &self.account.device_hash)
            .await
        {
            Ok(raw) => {
                self.state.write().await.device_on = target.is_on();
                info!(
                    "[{}] device toggled {}: {}",
                    self.account.wallet_address,
                    target.as_str(),
                    raw
                );
                Ok(raw)
            }
            Err(e) => {
                warn!(
                    "[{}] device toggle {} failed: {}",
                    self.account.wallet_address,
                    target.as_str(),
                    e
                );
                Err(e)
            }
        }
    }

    async fn send_heartbeat(&self) -> ApiResult<Value> {
        let event = {
            let state = self.state.read().await;
            HeartbeatEvent {
                wallet_address: self.account.wallet_address.clone(),
                device_hash: self.account.device_hash.clone(),
                is_installed: state.is_installed,
                toggle_state: state.device_on,
                whitelisted_urls: WHITELISTED_URLS.iter().map(ToString::to_string).collect(),
            }
        };

        match self.client.produce_heartbeat(event).await {
            Ok(raw) => {
                info!("[{}] heartbeat sent", self.account.wallet_address);
                Ok(raw)
            }
            Err(e) => {
                warn!("[{}] heartbeat failed: {}", self.account.wallet_address, e);
                Err(e)
            }
        }
    }

    async fn report_earnings(&self) -> ApiResult<f64> {
        let details = match self.client.wallet_details(&self.account.wallet_address).await {
            Ok(details) => details,
            Err(e) => {
                warn!(
                    "[{}] wallet details failed: {}",
                    self.account.wallet_address, e
                );
                return Err(e);
            }
        };

        let uptime = self.state.read().await.uptime_minutes;
        let estimated = estimate_session_earnings(uptime, details.active_rate_per_minute);
        info!(
            "[{}] earnings: total {} | today {} | session est. {:.4}",
            self.account.wallet_address,
            details.total_earnings,
            details.today_earnings,
            estimated
        );
        Ok(estimated)
    }

    /// One cycle tick, strictly in sequence: uptime, toggle re-check,
    /// heartbeat, earnings, uptime log. Per-call failures are logged by the
    /// operations themselves and swallowed here; only unexpected errors
    /// propagate to the caller.
    async fn run_cycle(&self) -> Result<(), Error> {
        let uptime = {
            let mut state = self.state.write().await;
            state.uptime_minutes += 1;
            state.uptime_minutes
        };

        if !self.state.read().await.device_on {
            let _ = self.toggle_device(DeviceState::On).await;
        }

        let _ = self.send_heartbeat().await;
        let _ = self.report_earnings().await;

        info!(
            "[{}] {} uptime: {} min",
            self.account.wallet_address,
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            uptime
        );

        if uptime % WAKE_NOTICE_EVERY == 0 {
            debug!(
                "[{}] wake-up: keeping the device session warm",
                self.account.wallet_address
            );
        }

        Ok(())
    }
}
