//! Provider registry
//!
//! The registry maps each [`ProviderId`] to the constructor that builds its
//! [`Settings`], avoiding hardcoded match chains in callers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_core::registry::ProviderRegistry;
//! use ddns_core::IpVersion;
//!
//! // Build the registry once at startup
//! let mut registry = ProviderRegistry::new();
//! ddns_providers::register_all(&mut registry)?;
//!
//! // Create settings from configuration
//! let options = serde_json::json!({ "password": "secret" });
//! let settings = registry.create("dd24", &options, "example.com", "home", IpVersion::Ipv4)?;
//! ```
//!
//! ## Registration
//!
//! Provider crates expose a registration function:
//!
//! ```rust,ignore
//! pub fn register_all(registry: &mut ProviderRegistry) -> ddns_core::Result<()> {
//!     registry.register(ProviderId::Dd24, dd24::construct)?;
//!     Ok(())
//! }
//! ```

use crate::config::SettingsEntry;
use crate::error::{Error, Result};
use crate::traits::{Settings, SettingsFactory};
use crate::types::{IpVersion, ProviderId};
use std::collections::HashMap;
use tracing::debug;

/// Registry of settings constructors
///
/// Populated once at startup and then only read, so it needs no interior
/// locking; share it by reference or behind an `Arc`.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: HashMap<ProviderId, Box<dyn SettingsFactory>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.list_providers())
            .finish()
    }
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the constructor for `provider`
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateProvider`] if `provider` already has a constructor.
    /// A second registration is a wiring defect, so callers treat it as
    /// fatal.
    pub fn register<F>(&mut self, provider: ProviderId, factory: F) -> Result<()>
    where
        F: SettingsFactory + 'static,
    {
        if self.factories.contains_key(&provider) {
            return Err(Error::DuplicateProvider(provider));
        }
        self.factories.insert(provider, Box::new(factory));
        debug!(provider = %provider, "Registered provider");
        Ok(())
    }

    /// Create settings for the provider named by `token`
    ///
    /// # Parameters
    ///
    /// - `token`: Provider token from configuration, e.g. "dd24"
    /// - `options`: Provider specific options
    /// - `domain`, `host`, `ip_version`: The record to manage
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn Settings>)`: Validated settings
    /// - `Err(Error::UnknownProvider)`: `token` names no registered provider
    /// - `Err(Error::Validation)`: The constructor rejected the options
    pub fn create(
        &self,
        token: &str,
        options: &serde_json::Value,
        domain: &str,
        host: &str,
        ip_version: IpVersion,
    ) -> Result<Box<dyn Settings>> {
        let provider = ProviderId::parse(token)?;
        self.create_with_id(provider, options, domain, host, ip_version)
    }

    /// Create settings for an already parsed provider id
    pub fn create_with_id(
        &self,
        provider: ProviderId,
        options: &serde_json::Value,
        domain: &str,
        host: &str,
        ip_version: IpVersion,
    ) -> Result<Box<dyn Settings>> {
        let factory = self
            .factories
            .get(&provider)
            .ok_or_else(|| Error::unknown_provider(provider.as_str()))?;

        factory.create(options, domain, host, ip_version)
    }

    /// Create settings from one configuration file entry
    pub fn create_from_entry(&self, entry: &SettingsEntry) -> Result<Box<dyn Settings>> {
        self.create(
            &entry.provider,
            &entry.options_value(),
            &entry.domain,
            &entry.host,
            entry.ip_version,
        )
    }

    /// Check if a provider token is registered
    pub fn has_provider(&self, token: &str) -> bool {
        ProviderId::parse(token).is_ok_and(|provider| self.factories.contains_key(&provider))
    }

    /// List registered providers, in enumeration order
    pub fn list_providers(&self) -> Vec<ProviderId> {
        ProviderId::all()
            .filter(|provider| self.factories.contains_key(provider))
            .collect()
    }

    /// Enumeration members that have no constructor
    ///
    /// Empty for a complete registry.
    pub fn missing_providers(&self) -> Vec<ProviderId> {
        ProviderId::all()
            .filter(|provider| !self.factories.contains_key(provider))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
