//! Test doubles shared by the contract tests
//!
//! `EchoSettings` is a minimal provider speaking a dyndns-like plain text
//! protocol against a local mock server, so the contracts can be checked
//! without any real provider module.

#![allow(dead_code)]

use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rule, Verdict, rule};
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::MockServer;

pub const ECHO_RULES: &[Rule] = &[
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    rule(Marker::StartsWith("badauth"), Verdict::AuthFailed),
    rule(Marker::StartsWith("nochg"), Verdict::Unchanged),
    rule(Marker::StartsWith("good"), Verdict::Updated),
];

#[derive(Debug)]
pub struct EchoSettings {
    target: RecordTarget,
}

impl EchoSettings {
    pub fn new(domain: &str, host: &str) -> Self {
        Self {
            target: RecordTarget::new(ProviderId::Dyn, domain, host, IpVersion::Ipv4)
                .expect("valid target"),
        }
    }
}

#[async_trait]
impl Settings for EchoSettings {
    fn provider(&self) -> ProviderId {
        ProviderId::Dyn
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let mut url = Url::parse("https://members.example.net/nic/update").expect("valid url");
        url.query_pairs_mut()
            .append_pair("hostname", &self.build_domain_name())
            .append_pair("myip", &ip.to_string());

        let request = transport.request(Method::GET, url);
        let response = transport.execute(self.provider(), cancel, request).await?;
        let acceptance = classify::evaluate(self.provider(), ECHO_RULES, &response)?;
        let ip = classify::confirm_ip(self.provider(), classify::find_ip(&response.body), ip, false)?;
        Ok(match acceptance {
            classify::Acceptance::Updated => UpdateOutcome::Updated { ip },
            classify::Acceptance::Unchanged => UpdateOutcome::Unchanged { ip },
        })
    }
}

/// A transport whose requests all go to `server`
pub fn transport_for(server: &MockServer) -> Transport {
    let base = Url::parse(&server.uri()).expect("mock server uri");
    Transport::new(reqwest::Client::new()).with_base_url(base)
}

pub fn ipv4(text: &str) -> IpAddr {
    text.parse().expect("valid address")
}
