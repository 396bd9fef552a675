//! Shared helpers for provider contract tests

#![allow(dead_code)]

use ddns_core::{IpVersion, ProviderRegistry, Settings, Transport};
use std::net::IpAddr;
use url::Url;
use wiremock::MockServer;

/// A transport whose requests all go to `server`
pub fn transport_for(server: &MockServer) -> Transport {
    let base = Url::parse(&server.uri()).expect("mock server uri");
    Transport::new(reqwest::Client::new()).with_base_url(base)
}

pub fn registry() -> ProviderRegistry {
    ddns_providers::default_registry().expect("registry builds")
}

/// Build settings through the registry, as the daemon does
pub fn settings(token: &str, options: serde_json::Value, domain: &str, host: &str) -> Box<dyn Settings> {
    registry()
        .create(token, &options, domain, host, IpVersion::Ipv4OrIpv6)
        .expect("valid settings")
}

pub fn ip(text: &str) -> IpAddr {
    text.parse().expect("valid address")
}
