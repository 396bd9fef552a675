//! dynv6 update API

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

const UPDATE_URL: &str = "https://dynv6.com/api/update";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::Status(401), Verdict::AuthFailed),
    rule(Marker::NonSuccess, Verdict::BadStatus),
    rule(Marker::Contains("unchanged"), Verdict::Unchanged),
    rule(Marker::Contains("updated"), Verdict::Updated),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    token: String,
    provider_ip: bool,
}

#[derive(Debug)]
pub struct Dynv6 {
    target: RecordTarget,
    token: SecretString,
    use_provider_ip: bool,
}

/// Build dynv6 settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Dynv6;
    let options: Options = decode_options(provider, options)?;
    require(provider, "token", &options.token)?;

    Ok(Box::new(Dynv6 {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        token: SecretString::from(options.token),
        use_provider_ip: options.provider_ip,
    }))
}

impl Dynv6 {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let mut url = common::endpoint(ProviderId::Dynv6, UPDATE_URL)?;
        let family = if ip.is_ipv6() { "ipv6" } else { "ipv4" };
        url.query_pairs_mut()
            .append_pair("hostname", &self.build_domain_name())
            .append_pair("token", self.token.expose_secret())
            .append_pair(family, &common::ip_or_auto(ip, self.use_provider_ip));

        let request = transport.request(Method::GET, url);
        let response = transport.execute(ProviderId::Dynv6, cancel, request).await?;
        let acceptance = classify::evaluate(ProviderId::Dynv6, RULES, &response)?;
        Ok(common::outcome(acceptance, ip))
    }
}

#[async_trait]
impl Settings for Dynv6 {
    fn provider(&self) -> ProviderId {
        ProviderId::Dynv6
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
