//! Fleet driver: one agent per account, proxies assigned round-robin

use std::sync::Arc;

use tokio::time::Duration;
use tracing::info;

use devpulse_core::config::{Account, FleetConfig};
use devpulse_core::Error;

use crate::agent::HeartbeatAgent;
use crate::client::ApiClient;

/// Builds and runs the full set of heartbeat agents
pub struct FleetDriver {
    agents: Vec<Arc<HeartbeatAgent>>,
}

impl FleetDriver {
    /// Build one agent per account
    ///
    /// Proxies are assigned round-robin when enabled and present; a failure
    /// building any agent's client aborts startup.
    pub fn build(
        config: &FleetConfig,
        accounts: Vec<Account>,
        proxies: &[String],
        use_proxies: bool,
    ) -> devpulse_core::Result<Self> {
        let cycle_interval = Duration::from_secs(config.cycle_interval_s);
        let mut agents = Vec::with_capacity(accounts.len());

        for (idx, account) in accounts.into_iter().enumerate() {
            let proxy = assign_proxy(proxies, idx, use_proxies);
            let client = ApiClient::new(&account.token, proxy)
                .map_err(|e| {
                    Error::Fleet(format!("agent for {}: {}", account.wallet_address, e))
                })?
                .with_base_url(&config.api_base);

            agents.push(Arc::new(HeartbeatAgent::new(account, client, cycle_interval)));
        }

        Ok(Self { agents })
    }

    pub fn agents(&self) -> &[Arc<HeartbeatAgent>] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Start every agent's heartbeat cycle
    pub async fn start_all(&self) {
        for agent in &self.agents {
            agent.start().await;
        }
        info!("Fleet started: {} agent(s)", self.agents.len());
    }

    /// Stop every agent, issuing one best-effort OFF toggle each
    pub async fn shutdown_all(&self) {
        info!("Shutting down fleet ({} agent(s))", self.agents.len());
        for agent in &self.agents {
            agent.shutdown().await;
        }
    }
}

/// Round-robin proxy assignment; `None` when disabled or no proxies exist
fn assign_proxy(proxies: &[String], idx: usize, use_proxies: bool) -> Option<&str> {
    if !use_proxies || proxies.is_empty() {
        return None;
    }
    Some(proxies[idx % proxies.len()].as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxies() -> Vec<String> {
        vec!["p1".to_string(), "p2".to_string(), "p3".to_string()]
    }

    #[test]
    fn test_assign_proxy_round_robin_wraps() {
        let proxies = proxies();
        assert_eq!(assign_proxy(&proxies, 0, true), Some("p1"));
        assert_eq!(assign_proxy(&proxies, 1, true), Some("p2"));
        assert_eq!(assign_proxy(&proxies, 2, true), Some("p3"));
        assert_eq!(assign_proxy(&proxies, 3, true), Some("p1"));
        assert_eq!(assign_proxy(&proxies, 7, true), Some("p2"));
    }

    #[test]
    fn test_assign_proxy_disabled_or_empty() {
        let proxies = proxies();
        assert_eq!(assign_proxy(&proxies, 0, false), None);
        assert_eq!(assign_proxy(&[], 0, true), None);
    }

    #[test]
    fn test_build_fleet_one_agent_per_account() {
        let accounts = vec![
            Account {
                wallet_address: "0xA".to_string(),
                token: "t1".to_string(),
                device_hash: "d1".to_string(),
            },
            Account {
                wallet_address: "0xB".to_string(),
                token: "t2".to_string(),
                device_hash: "d2".to_string(),
            },
        ];

        let fleet = FleetDriver::build(&FleetConfig::default(), accounts, &[], false).unwrap();
        assert_eq!(fleet.len(), 2);
        assert_eq!(fleet.agents()[0].wallet_address(), "0xA");
        assert_eq!(fleet.agents()[1].wallet_address(), "0xB");
    }

    #[test]
    fn test_build_fleet_rejects_bad_token() {
        let accounts = vec![Account {
            wallet_address: "0xA".to_string(),
            token: "bad\ntoken".to_string(),
            device_hash: "d1".to_string(),
        }];

        let err = FleetDriver::build(&FleetConfig::default(), accounts, &[], false).unwrap_err();
        assert!(err.to_string().contains("0xA"));
    }
}
