//! DuckDNS
//!
//! The domain is always `duckdns.org`; the host is the subdomain label
//! sent as `domains`.

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require_match};
use ddns_core::types::ROOT_HOST;
use ddns_core::{Error, IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const UPDATE_URL: &str = "https://www.duckdns.org/update";

const TOKEN_PATTERN: &str = r"^[a-f0-9]{8}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{4}-[a-f0-9]{12}$";

/// Response rules, checked in order
///
/// The verbose body is `OK\n<ipv4>\n<ipv6>\nUPDATED|NOCHANGE`.
pub const RULES: &[Rule] = &[
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    rule(Marker::StartsWith("ko"), Verdict::AuthFailed),
    rule(Marker::Contains("nochange"), Verdict::Unchanged),
    rule(Marker::StartsWith("ok"), Verdict::Updated),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    token: String,
    provider_ip: bool,
}

#[derive(Debug)]
pub struct DuckDns {
    target: RecordTarget,
    token: SecretString,
    use_provider_ip: bool,
}

/// Build DuckDNS settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Duckdns;
    let options: Options = decode_options(provider, options)?;
    require_match(provider, "token", &options.token, TOKEN_PATTERN)?;
    if host == ROOT_HOST || host == "*" || host.contains('.') {
        return Err(Error::validation(provider, "host", "must be a single subdomain label"));
    }

    Ok(Box::new(DuckDns {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        token: SecretString::from(options.token),
        use_provider_ip: options.provider_ip,
    }))
}

impl DuckDns {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let mut url = common::endpoint(ProviderId::Duckdns, UPDATE_URL)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("verbose", "true")
                .append_pair("domains", self.host())
                .append_pair("token", self.token.expose_secret());
            if !self.use_provider_ip {
                let key = if ip.is_ipv6() { "ipv6" } else { "ip" };
                query.append_pair(key, &ip.to_string());
            }
        }

        let request = transport.request(Method::GET, url);
        let response = transport.execute(ProviderId::Duckdns, cancel, request).await?;
        let acceptance = classify::evaluate(ProviderId::Duckdns, RULES, &response)?;
        common::echoed_outcome(ProviderId::Duckdns, acceptance, &response, ip, self.use_provider_ip)
    }
}

#[async_trait]
impl Settings for DuckDns {
    fn provider(&self) -> ProviderId {
        ProviderId::Duckdns
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
