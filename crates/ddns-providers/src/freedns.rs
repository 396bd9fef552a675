//! FreeDNS (afraid.org) dynamic update v2
//!
//! The update token identifies the record, so the request carries no
//! hostname. IPv6 records are updated through a separate host.

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rejection, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const UPDATE_URL_V4: &str = "https://sync.afraid.org/u";
const UPDATE_URL_V6: &str = "https://v6.sync.afraid.org/u";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::NonSuccess, Verdict::BadStatus),
    rule(Marker::Contains("unable to locate"), Verdict::Rejected(Rejection::HostnameNotFound)),
    rule(Marker::Contains("no ip change detected"), Verdict::Unchanged),
    rule(Marker::Contains("updated"), Verdict::Updated),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    token: String,
}

#[derive(Debug)]
pub struct FreeDns {
    target: RecordTarget,
    token: SecretString,
}

/// Build FreeDNS settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Freedns;
    let options: Options = decode_options(provider, options)?;
    require(provider, "token", &options.token)?;

    Ok(Box::new(FreeDns {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        token: SecretString::from(options.token),
    }))
}

impl FreeDns {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let base = if ip.is_ipv6() { UPDATE_URL_V6 } else { UPDATE_URL_V4 };
        // trailing empty segment keeps the path as /u/<token>/
        let mut url = common::endpoint_with_path(ProviderId::Freedns, base, &[self.token.expose_secret(), ""])?;
        url.query_pairs_mut().append_pair("ip", &ip.to_string());

        let request = transport.request(Method::GET, url);
        let response = transport.execute(ProviderId::Freedns, cancel, request).await?;
        let acceptance = classify::evaluate(ProviderId::Freedns, RULES, &response)?;
        Ok(common::outcome(acceptance, ip))
    }
}

#[async_trait]
impl Settings for FreeDns {
    fn provider(&self) -> ProviderId {
        ProviderId::Freedns
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::classify::classify;

    #[test]
    fn test_rules() {
        assert_eq!(
            classify(RULES, 200, "ERROR: Address 1.2.3.4 has not changed. No IP change detected"),
            Verdict::Unchanged
        );
        assert_eq!(
            classify(RULES, 200, "Updated 1 host(s) [home.example.com] to 1.2.3.4 in 0.2 seconds"),
            Verdict::Updated
        );
        assert_eq!(
            classify(RULES, 200, "ERROR: Unable to locate this record (changed password?)"),
            Verdict::Rejected(Rejection::HostnameNotFound)
        );
    }

    #[test]
    fn test_token_path() {
        let url = common::endpoint_with_path(ProviderId::Freedns, UPDATE_URL_V4, &["abc", ""]).unwrap();
        assert_eq!(url.as_str(), "https://sync.afraid.org/u/abc/");
    }
}
