//! Configuration validation

use super::schema::{Account, Config};
use crate::error::Error;

/// Validate the loaded configuration
pub fn validate_config(config: &Config) -> crate::Result<()> {
    if config.fleet.cycle_interval_s == 0 {
        return Err(Error::Config(
            "fleet.cycle_interval_s must be at least 1".to_string(),
        ));
    }

    if config.fleet.api_base.trim().is_empty() {
        return Err(Error::Config("fleet.api_base must not be empty".to_string()));
    }

    Ok(())
}

/// Validate the account list
pub fn validate_accounts(accounts: &[Account]) -> crate::Result<()> {
    if accounts.is_empty() {
        return Err(Error::Config("accounts.json contains no accounts".to_string()));
    }

    for (idx, account) in accounts.iter().enumerate() {
        if account.wallet_address.trim().is_empty() {
            return Err(Error::Config(format!(
                "account #{}: walletAddress is empty",
                idx + 1
            )));
        }
        if account.token.trim().is_empty() {
            return Err(Error::Config(format!("account #{}: token is empty", idx + 1)));
        }
        if account.device_hash.trim().is_empty() {
            return Err(Error::Config(format!(
                "account #{}: deviceHash is empty",
                idx + 1
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(wallet: &str, token: &str, hash: &str) -> Account {
        Account {
            wallet_address: wallet.to_string(),
            token: token.to_string(),
            device_hash: hash.to_string(),
        }
    }

    #[test]
    fn test_validate_config_default_ok() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_config_zero_interval() {
        let mut config = Config::default();
        config.fleet.cycle_interval_s = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("cycle_interval_s"));
    }

    #[test]
    fn test_validate_accounts_empty_list() {
        let err = validate_accounts(&[]).unwrap_err();
        assert!(err.to_string().contains("no accounts"));
    }

    #[test]
    fn test_validate_accounts_empty_field() {
        let accounts = vec![account("0xA", "t1", "d1"), account("0xB", "", "d2")];
        let err = validate_accounts(&accounts).unwrap_err();
        assert!(err.to_string().contains("account #2"));
    }

    #[test]
    fn test_validate_accounts_ok() {
        let accounts = vec![account("0xA", "t1", "d1")];
        assert!(validate_accounts(&accounts).is_ok());
    }
}
