//! Configuration types for the DDNS system
//!
//! A configuration file lists one entry per record:
//!
//! ```json
//! {
//!   "settings": [
//!     { "provider": "dd24", "domain": "example.com", "host": "@", "password": "secret" }
//!   ]
//! }
//! ```
//!
//! `provider`, `domain`, `host` and `ip_version` are common to every entry;
//! all other keys are provider options, decoded by the provider's
//! constructor through [`decode_options`].

use crate::error::{Error, Result};
use crate::types::{IpVersion, ProviderId, ROOT_HOST};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// One entry per managed record
    #[serde(default)]
    pub settings: Vec<SettingsEntry>,
}

impl ConfigFile {
    /// Parse a configuration document
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::config(format!("invalid settings JSON: {e}")))
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }
}

/// One configured record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsEntry {
    /// Provider token, e.g. "dd24"
    pub provider: String,

    pub domain: String,

    /// Subdomain label, or "@" for the bare domain
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default, deserialize_with = "deserialize_ip_version")]
    pub ip_version: IpVersion,

    /// Provider specific options
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl SettingsEntry {
    /// Create an entry with no provider options
    pub fn new(provider: impl Into<String>, domain: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            domain: domain.into(),
            host: host.into(),
            ip_version: IpVersion::default(),
            options: Map::new(),
        }
    }

    /// Set the IP version
    pub fn with_ip_version(mut self, ip_version: IpVersion) -> Self {
        self.ip_version = ip_version;
        self
    }

    /// Add a provider option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Provider options as the raw payload handed to constructors
    pub fn options_value(&self) -> Value {
        Value::Object(self.options.clone())
    }
}

fn default_host() -> String {
    ROOT_HOST.to_string()
}

fn deserialize_ip_version<'de, D>(deserializer: D) -> std::result::Result<IpVersion, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
}

/// Decode a provider's raw options into its typed options struct
///
/// A missing payload decodes like an empty object, so structs whose fields
/// all have defaults decode successfully and required-field checks report
/// the precise field.
pub fn decode_options<T: DeserializeOwned>(provider: ProviderId, options: &Value) -> Result<T> {
    let payload = if options.is_null() {
        Value::Object(Map::new())
    } else {
        options.clone()
    };
    serde_json::from_value(payload).map_err(|e| Error::validation(provider, "options", e.to_string()))
}

/// Fail unless `value` is non-empty
pub fn require(provider: ProviderId, field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::validation(provider, field, "cannot be empty"));
    }
    Ok(())
}

/// Fail unless `value` matches the regular expression `pattern`
///
/// The value itself is not echoed since it is usually a credential.
pub fn require_match(provider: ProviderId, field: &'static str, value: &str, pattern: &str) -> Result<()> {
    require(provider, field, value)?;
    let regex = Regex::new(pattern)
        .map_err(|e| Error::config(format!("{provider}: invalid pattern for {field}: {e}")))?;
    if !regex.is_match(value) {
        return Err(Error::validation(provider, field, format!("does not match {pattern}")));
    }
    Ok(())
}
