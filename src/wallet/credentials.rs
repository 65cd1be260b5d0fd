//! Credential handling
//!
//! Secrets are resolved from the environment at runtime. The configuration
//! only names the variable, so a printed or logged `Config` never carries key
//! material.

use std::fmt;

use tracing::debug;
use zeroize::Zeroizing;

use crate::config::WalletConfig;
use crate::error::{Error, Result};

/// A secret string: zeroed on drop, masked in `Debug` and `Display`
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Borrow the raw value. Only call this at the point of use.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Runtime credentials for the trading collaborator
#[derive(Debug, Clone)]
pub struct Credentials {
    /// PumpPortal Lightning API key
    pub api_key: Secret,
}

impl Credentials {
    /// Resolve credentials from the environment variable named in the config
    pub fn from_env(wallet: &WalletConfig) -> Result<Self> {
        let value = Zeroizing::new(
            std::env::var(&wallet.api_key_env)
                .map_err(|_| Error::MissingEnvVar(wallet.api_key_env.clone()))?,
        );

        if value.trim().is_empty() {
            return Err(Error::MissingEnvVar(wallet.api_key_env.clone()));
        }

        debug!("Loaded trade API key from ${}", wallet.api_key_env);

        Ok(Self {
            api_key: Secret::new(value.trim()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet_with_env(name: &str) -> WalletConfig {
        WalletConfig {
            api_key_env: name.to_string(),
            ..WalletConfig::default()
        }
    }

    #[test]
    fn test_secret_is_masked() {
        let secret = Secret::new("pp_test_key_0123456789abcdef");
        assert_eq!(format!("{}", secret), "***");
        assert_eq!(format!("{:?}", secret), "Secret(***)");
        assert_eq!(secret.expose(), "pp_test_key_0123456789abcdef");
    }

    #[test]
    fn test_credentials_debug_hides_key() {
        let creds = Credentials {
            api_key: Secret::new("super-secret"),
        };
        assert!(!format!("{:?}", creds).contains("super-secret"));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("PUMPFUN_TRADER_TEST_KEY_PRESENT", " abc123 ");
        let creds = Credentials::from_env(&wallet_with_env("PUMPFUN_TRADER_TEST_KEY_PRESENT")).unwrap();
        assert_eq!(creds.api_key.expose(), "abc123");
    }

    #[test]
    fn test_missing_env_var() {
        let err = Credentials::from_env(&wallet_with_env("PUMPFUN_TRADER_TEST_KEY_ABSENT")).unwrap_err();
        assert!(matches!(err, Error::MissingEnvVar(name) if name == "PUMPFUN_TRADER_TEST_KEY_ABSENT"));
    }
}
