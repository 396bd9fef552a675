//! DD24 (domaindiscount24) dynamic DNS
//!
//! ## API Reference
//!
//! - FAQ: https://www.domaindiscount24.com/faq/en/dynamic-dns
//! - Update: GET `https://dynamicdns.key-systems.net/update.php?hostname=...&password=...&ip=...`
//!
//! An empty body with a 200 status means the update was accepted.

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const UPDATE_URL: &str = "https://dynamicdns.key-systems.net/update.php";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    rule(Marker::Contains("authorization failed"), Verdict::AuthFailed),
    rule(Marker::Empty, Verdict::Updated),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    password: String,
    provider_ip: bool,
}

/// DD24 settings
///
/// # Security
///
/// The password is kept in a [`SecretString`] and never appears in `Debug`
/// output or logs.
#[derive(Debug)]
pub struct Dd24 {
    target: RecordTarget,
    password: SecretString,
    /// Send `ip=auto` and let DD24 use the connection's address
    use_provider_ip: bool,
}

impl Dd24 {
    /// Create DD24 settings
    ///
    /// # Parameters
    ///
    /// - `options`: `{"password": "...", "provider_ip": false}`
    /// - `domain`, `host`, `ip_version`: The record to manage
    ///
    /// # Errors
    ///
    /// [`ddns_core::Error::Validation`] naming `password` when it is empty.
    pub fn new(options: &serde_json::Value, domain: &str, host: &str, ip_version: IpVersion) -> Result<Self> {
        let provider = ProviderId::Dd24;
        let options: Options = decode_options(provider, options)?;
        require(provider, "password", &options.password)?;

        Ok(Self {
            target: RecordTarget::new(provider, domain, host, ip_version)?,
            password: SecretString::from(options.password),
            use_provider_ip: options.provider_ip,
        })
    }

    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let mut url = common::endpoint(ProviderId::Dd24, UPDATE_URL)?;
        url.query_pairs_mut()
            .append_pair("hostname", &self.build_domain_name())
            .append_pair("password", self.password.expose_secret())
            .append_pair("ip", &common::ip_or_auto(ip, self.use_provider_ip));

        let request = transport.request(Method::GET, url);
        let response = transport.execute(ProviderId::Dd24, cancel, request).await?;
        let acceptance = classify::evaluate(ProviderId::Dd24, RULES, &response)?;
        Ok(common::outcome(acceptance, ip))
    }
}

/// Build DD24 settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    Ok(Box::new(Dd24::new(options, domain, host, ip_version)?))
}

#[async_trait]
impl Settings for Dd24 {
    fn provider(&self) -> ProviderId {
        ProviderId::Dd24
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    /// Update the record
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /update.php?hostname=home.example.com&password=<password>&ip=1.2.3.4
    /// User-Agent: ddns-updater/<version>
    /// ```
    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
