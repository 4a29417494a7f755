//! CLI entry point for devpulse

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use dialoguer::Confirm;
use tracing::{info, warn};

use devpulse_agent::FleetDriver;
use devpulse_core::config::ConfigLoader;
use devpulse_core::logging::init_logging;

#[derive(Parser)]
#[command(name = "devpulse")]
#[command(about = "Fleet driver for simulated device heartbeat agents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration directory (default: ~/.devpulse)
    #[arg(short, long, global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the fleet until interrupted
    Run {
        /// Route agents through the configured proxies without asking
        #[arg(long, conflicts_with = "no_proxies")]
        yes_proxies: bool,
        /// Skip proxies without asking
        #[arg(long)]
        no_proxies: bool,
    },
    /// List configured accounts and proxies
    Accounts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = if let Some(dir) = cli.config_dir {
        ConfigLoader::with_dir(dir)
    } else {
        ConfigLoader::new()
    };

    match cli.command {
        Commands::Run {
            yes_proxies,
            no_proxies,
        } => run_fleet(&loader, yes_proxies, no_proxies).await?,
        Commands::Accounts => run_accounts(&loader)?,
    }

    Ok(())
}

/// Load config, start the fleet, wait for Ctrl-C, shut down cleanly
async fn run_fleet(loader: &ConfigLoader, yes_proxies: bool, no_proxies: bool) -> Result<()> {
    let config = loader.load()?;
    let _log_guard = init_logging(&config.logging);

    let accounts = loader.load_accounts()?;
    let proxies = loader.load_proxies();

    let use_proxies = resolve_proxy_choice(&proxies, yes_proxies, no_proxies)?;

    println!();
    println!("{}", style("devpulse").bold().cyan());
    println!(
        "{} account(s), {} — cycle every {}s",
        accounts.len(),
        if use_proxies {
            format!("{} proxy endpoint(s)", proxies.len())
        } else {
            "no proxies".to_string()
        },
        config.fleet.cycle_interval_s
    );
    for account in &accounts {
        println!("  {} {}", style("•").green(), account.wallet_address);
    }
    println!();

    let fleet = FleetDriver::build(&config.fleet, accounts, &proxies, use_proxies)?;
    fleet.start_all().await;

    info!("Fleet running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    println!("\n{}", style("Interrupt received, stopping fleet...").yellow());
    fleet.shutdown_all().await;
    println!("{}", style("Fleet stopped.").green());

    Ok(())
}

/// Decide whether to route agents through proxies
///
/// Flags win; otherwise ask interactively when proxies are configured.
fn resolve_proxy_choice(proxies: &[String], yes_proxies: bool, no_proxies: bool) -> Result<bool> {
    if no_proxies {
        return Ok(false);
    }
    if yes_proxies {
        if proxies.is_empty() {
            warn!("--yes-proxies given but no proxies are configured");
            return Ok(false);
        }
        return Ok(true);
    }
    if proxies.is_empty() {
        return Ok(false);
    }

    let choice = Confirm::new()
        .with_prompt(format!(
            "Route agents through the {} configured prox{}?",
            proxies.len(),
            if proxies.len() == 1 { "y" } else { "ies" }
        ))
        .default(true)
        .interact()?;
    Ok(choice)
}

/// Print the configured accounts with masked tokens
fn run_accounts(loader: &ConfigLoader) -> Result<()> {
    let accounts = loader.load_accounts()?;
    let proxies = loader.load_proxies();

    println!("{}", style("Configured accounts").bold());
    for account in &accounts {
        println!(
            "  {}  token {}  device {}",
            style(&account.wallet_address).cyan(),
            mask_token(&account.token),
            account.device_hash
        );
    }
    println!("{} proxy endpoint(s) configured", proxies.len());

    Ok(())
}

/// Keep only the first and last few characters of a token
fn mask_token(token: &str) -> String {
    if token.len() <= 8 {
        return "*".repeat(token.len());
    }
    format!("{}…{}", &token[..4], &token[token.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token_short() {
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token("12345678"), "********");
    }

    #[test]
    fn test_mask_token_long() {
        assert_eq!(mask_token("abcdefghijkl"), "abcd…ijkl");
    }

    #[test]
    fn test_resolve_proxy_choice_flags() {
        let proxies = vec!["p1".to_string()];
        assert!(!resolve_proxy_choice(&proxies, false, true).unwrap());
        assert!(resolve_proxy_choice(&proxies, true, false).unwrap());
        // --yes-proxies with nothing configured falls back to direct
        assert!(!resolve_proxy_choice(&[], true, false).unwrap());
        // no proxies at all: never prompts
        assert!(!resolve_proxy_choice(&[], false, false).unwrap());
    }
}
