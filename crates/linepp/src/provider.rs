//! Secret and profile value providers
//!
//! `secret:` and `profile:` variable references are resolved through an
//! optional [`ProfileProvider`] held by the preprocessor. Providers are shared
//! read-only and must be safe for concurrent use.

use std::collections::HashMap;

use thiserror::Error;

/// Lookup failure reported by a provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("`{0}` not found")]
    NotFound(String),

    #[error("no secret/profile provider available")]
    NotAvailable,
}

/// Resolves secret and profile values by name
pub trait ProfileProvider: Send + Sync {
    /// Look up a secret; `name` carries its property selector, e.g. `db[password]`
    fn secret_value(&self, name: &str, source: Option<&str>) -> Result<String, ProviderError>;

    /// Look up a profile value
    fn profile_value(&self, name: &str) -> Result<String, ProviderError>;
}

/// Provider backed by in-memory maps
///
/// Secrets are keyed by `name[property]`, optionally suffixed with `:source`
/// when they belong to a specific source.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    secrets: HashMap<String, String>,
    profile: HashMap<String, String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_secret(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.secrets.insert(key.into(), value.into());
    }

    pub fn insert_profile(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.profile.insert(name.into(), value.into());
    }

    pub fn with_secret(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_secret(key, value);
        self
    }

    pub fn with_profile(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_profile(name, value);
        self
    }
}

impl ProfileProvider for MemoryProvider {
    fn secret_value(&self, name: &str, source: Option<&str>) -> Result<String, ProviderError> {
        let key = match source {
            Some(source) => format!("{name}:{source}"),
            None => name.to_string(),
        };

        self.secrets
            .get(&key)
            .cloned()
            .ok_or(ProviderError::NotFound(key))
    }

    fn profile_value(&self, name: &str) -> Result<String, ProviderError> {
        self.profile
            .get(name)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(name.to_string()))
    }
}
