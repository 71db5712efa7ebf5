//! Provider credential resolution.
//!
//! The key is read once at startup from one of two environment variables.
//! The primary variable wins when both are set; empty values count as unset.

use super::config::PricingConfig;
use std::fmt;

/// Which configured source supplied the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Primary,
    Fallback,
}

/// Bearer credential for the pricing provider.
#[derive(Clone)]
pub struct Credential {
    key: String,
    source: CredentialSource,
    env_var: String,
}

impl Credential {
    pub fn new(key: impl Into<String>, source: CredentialSource, env_var: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            source,
            env_var: env_var.into(),
        }
    }

    /// Resolve the credential from the process environment.
    pub fn resolve(config: &PricingConfig) -> Option<Self> {
        Self::resolve_with(config, |name| std::env::var(name).ok())
    }

    /// Resolve the credential through an arbitrary lookup function.
    pub fn resolve_with<F>(config: &PricingConfig, lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let candidates = [
            (config.api_key_env.as_str(), CredentialSource::Primary),
            (config.fallback_api_key_env.as_str(), CredentialSource::Fallback),
        ];

        candidates.into_iter().find_map(|(env_var, source)| {
            lookup(env_var)
                .filter(|value| !value.trim().is_empty())
                .map(|key| Self::new(key, source, env_var))
        })
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// Name of the environment variable the key came from.
    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("key", &"[REDACTED]")
            .field("source", &self.source)
            .field("env_var", &self.env_var)
            .finish()
    }
}
