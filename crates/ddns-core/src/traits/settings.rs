// # Settings Trait
//
// Defines the contract every DNS provider implements.
//
// A `Settings` value is one configured (domain, host, provider) tuple. It is
// built once from configuration through the `ProviderRegistry`, never
// mutated afterwards, and asked to `update` whenever the scheduler observes
// a new public IP.
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{IpVersion, Transport};
// use tokio_util::sync::CancellationToken;
//
// let settings = registry.create("dd24", &options, "example.com", "home", IpVersion::Ipv4)?;
// let outcome = settings
//     .update(&CancellationToken::new(), &transport, "1.2.3.4".parse()?)
//     .await?;
// println!("{} now points to {}", settings.build_domain_name(), outcome.ip());
// ```

use crate::error::Result;
use crate::http::Transport;
use crate::types::{DisplayRow, IpVersion, ProviderId, RecordTarget, UpdateOutcome};
use async_trait::async_trait;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

/// Trait for provider settings implementations
///
/// # Update Protocol
///
/// `update` performs exactly one HTTP round trip:
/// - Builds one request from the stored configuration and the observed IP
/// - Sends it through the caller's [`Transport`], aborting when `cancel` fires
/// - Classifies the response with the provider's rule table
/// - Returns the effective IP or a classified error
///
/// Implementations never retry and never keep state between calls. Retry
/// cadence and backoff belong to the scheduler, which also guarantees at
/// most one in-flight update per record.
#[async_trait]
pub trait Settings: Send + Sync + std::fmt::Debug {
    /// The provider implementing these settings
    fn provider(&self) -> ProviderId;

    /// The record these settings keep up to date
    fn target(&self) -> &RecordTarget;

    fn domain(&self) -> &str {
        self.target().domain()
    }

    fn host(&self) -> &str {
        self.target().host()
    }

    fn ip_version(&self) -> IpVersion {
        self.target().ip_version()
    }

    /// Fully qualified hostname of the record
    fn build_domain_name(&self) -> String {
        self.target().fqdn()
    }

    /// Structured description for the status page
    fn describe(&self) -> DisplayRow {
        DisplayRow::new(self.provider(), self.target())
    }

    /// Point the record at `ip`
    ///
    /// # Returns
    ///
    /// - `Ok(UpdateOutcome)`: the provider confirmed the address now on record
    /// - `Err(Error)`: a classified failure, see [`crate::Error::kind`]
    async fn update(
        &self,
        cancel: &CancellationToken,
        transport: &Transport,
        ip: IpAddr,
    ) -> Result<UpdateOutcome>;
}

/// Constructor registered for a provider
///
/// Receives the raw provider options, the domain, the host and the IP
/// version. Must validate its input and must not perform I/O.
pub trait SettingsFactory: Send + Sync {
    fn create(
        &self,
        options: &serde_json::Value,
        domain: &str,
        host: &str,
        ip_version: IpVersion,
    ) -> Result<Box<dyn Settings>>;
}

impl<F> SettingsFactory for F
where
    F: Fn(&serde_json::Value, &str, &str, IpVersion) -> Result<Box<dyn Settings>> + Send + Sync,
{
    fn create(
        &self,
        options: &serde_json::Value,
        domain: &str,
        host: &str,
        ip_version: IpVersion,
    ) -> Result<Box<dyn Settings>> {
        self(options, domain, host, ip_version)
    }
}
