//! Gandi LiveDNS API v5

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::types::record_type;
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const API_BASE: &str = "https://dns.api.gandi.net/api/v5";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::Status(201), Verdict::Updated),
    rule(Marker::Status(401), Verdict::AuthFailed),
    rule(Marker::Status(403), Verdict::AuthFailed),
    rule(Marker::Status(429), Verdict::RateLimited),
    rule(Marker::NonSuccess, Verdict::BadStatus),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    key: String,
    /// Zero keeps Gandi's default
    ttl: u32,
}

#[derive(Serialize)]
struct UpdateRequest {
    rrset_values: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rrset_ttl: Option<u32>,
}

#[derive(Debug)]
pub struct Gandi {
    target: RecordTarget,
    key: SecretString,
    ttl: Option<u32>,
}

/// Build Gandi settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Gandi;
    let options: Options = decode_options(provider, options)?;
    require(provider, "key", &options.key)?;

    Ok(Box::new(Gandi {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        key: SecretString::from(options.key),
        ttl: (options.ttl > 0).then_some(options.ttl),
    }))
}

impl Gandi {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Gandi;
        let url = common::endpoint_with_path(
            provider,
            API_BASE,
            &["domains", self.domain(), "records", self.host(), record_type(ip)],
        )?;

        let payload = UpdateRequest {
            rrset_values: vec![ip.to_string()],
            rrset_ttl: self.ttl,
        };
        let request = transport
            .request(Method::PUT, url)
            .header("X-Api-Key", self.key.expose_secret())
            .json(&payload);

        let response = transport.execute(provider, cancel, request).await?;
        let acceptance = classify::evaluate(provider, RULES, &response)?;
        Ok(common::outcome(acceptance, ip))
    }
}

#[async_trait]
impl Settings for Gandi {
    fn provider(&self) -> ProviderId {
        ProviderId::Gandi
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
