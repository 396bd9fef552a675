//! DDNSS.de dynamic DNS

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

const UPDATE_URL: &str = "https://www.ddnss.de/upd.php";

/// Response rules, checked in order
///
/// The body is an HTML page; only the markers below are meaningful.
pub const RULES: &[Rule] = &[
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    rule(Marker::Contains("badysys"), Verdict::Rejected(Rejection::BadRequest)),
    rule(Marker::Contains("badauth"), Verdict::AuthFailed),
    rule(Marker::Contains("notfqdn"), Verdict::Rejected(Rejection::HostnameNotFound)),
    rule(Marker::Contains("updated 1 hostname"), Verdict::Updated),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    username: String,
    password: String,
    provider_ip: bool,
}

#[derive(Debug)]
pub struct Ddnss {
    target: RecordTarget,
    username: String,
    password: SecretString,
    use_provider_ip: bool,
}

/// Build DDNSS settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Ddnss;
    let options: Options = decode_options(provider, options)?;
    require(provider, "username", &options.username)?;
    require(provider, "password", &options.password)?;

    Ok(Box::new(Ddnss {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        username: options.username,
        password: SecretString::from(options.password),
        use_provider_ip: options.provider_ip,
    }))
}

impl Ddnss {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let mut url = common::endpoint(ProviderId::Ddnss, UPDATE_URL)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("user", &self.username)
                .append_pair("pwd", self.password.expose_secret())
                .append_pair("host", &self.build_domain_name());
            if !self.use_provider_ip {
                let key = if ip.is_ipv6() { "ip6" } else { "ip" };
                query.append_pair(key, &ip.to_string());
            }
        }

        let request = transport.request(Method::GET, url);
        let response = transport.execute(ProviderId::Ddnss, cancel, request).await?;
        let acceptance = classify::evaluate(ProviderId::Ddnss, RULES, &response)?;
        Ok(common::outcome(acceptance, ip))
    }
}

#[async_trait]
impl Settings for Ddnss {
    fn provider(&self) -> ProviderId {
        ProviderId::Ddnss
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
    fn test_rules_on_html_body() {
        let body = "<html><body>Updated 1 hostname.</body></html>";
        assert_eq!(classify(RULES, 200, body), Verdict::Updated);
        assert_eq!(classify(RULES, 200, "<b>badauth</b>"), Verdict::AuthFailed);
        assert_eq!(classify(RULES, 200, "notfqdn"), Verdict::Rejected(Rejection::HostnameNotFound));
        assert_eq!(classify(RULES, 200, "badysys"), Verdict::Rejected(Rejection::BadRequest));
        assert_eq!(classify(RULES, 200, "Updated 2 hostnames"), Verdict::Unknown);
    }
}
