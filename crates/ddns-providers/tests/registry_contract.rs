//! Contract Test: Provider registry
//!
//! Constraints verified:
//! - Every enumeration member has a registered constructor
//! - Every provider can be built from realistic options
//! - Unknown tokens and duplicate registrations are rejected

mod common;

use common::*;
use ddns_core::{Error, IpVersion, ProviderId, ProviderRegistry};
use serde_json::{Value, json};

fn valid_options(provider: ProviderId) -> Value {
    match provider {
        ProviderId::Cloudflare => json!({"zone_identifier": "z", "identifier": "r", "token": "t"}),
        ProviderId::Dd24 => json!({"password": "p"}),
        ProviderId::Ddnss => json!({"username": "u", "password": "p"}),
        ProviderId::Digitalocean => json!({"token": "t", "record_id": 1}),
        ProviderId::Dnsomatic => json!({"username": "u", "password": "p"}),
        ProviderId::Dnspod => json!({"token": "t", "record_id": "1"}),
        ProviderId::Dondominio => json!({"username": "u", "password": "p", "name": "n"}),
        ProviderId::Dreamhost => json!({"key": "ABCDEFGH12345678"}),
        ProviderId::Duckdns => json!({"token": "a1b2c3d4-e5f6-a7b8-c9d0-e1f2a3b4c5d6"}),
        ProviderId::Dyn => json!({"username": "u", "client_key": "k"}),
        ProviderId::Dynv6 => json!({"token": "t"}),
        ProviderId::Freedns => json!({"token": "t"}),
        ProviderId::Gandi => json!({"key": "k"}),
        ProviderId::Godaddy => json!({"key": "dKNk7ms8Gp_4Kt3vZ2Lgo1Qsc2aQCaVc", "secret": "4XmKjRLQmFGE6pV3wQ6r1Z"}),
        ProviderId::Google => json!({"username": "u", "password": "p"}),
        ProviderId::He => json!({"password": "p"}),
        ProviderId::Infomaniak => json!({"username": "u", "password": "p"}),
        ProviderId::Linode => json!({"token": "t", "domain_id": 1, "record_id": 2}),
        ProviderId::Luadns => json!({"email": "a@example.com", "token": "t", "zone_id": 1, "record_id": 2}),
        ProviderId::Namecheap => json!({"password": "0123456789abcdef0123456789abcdef"}),
        ProviderId::Njalla => json!({"key": "k"}),
        ProviderId::Noip => json!({"username": "u", "password": "p"}),
        ProviderId::Opendns => json!({"username": "u", "password": "p"}),
        ProviderId::Ovh => json!({"username": "u", "password": "p"}),
        ProviderId::SelfhostDe => json!({"username": "u", "password": "p"}),
        ProviderId::Spdyn => json!({"token": "t"}),
        ProviderId::Strato => json!({"password": "p"}),
    }
}

/// Host accepted by every provider; DuckDNS needs a label, DonDominio the root
fn host_for(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::Duckdns => "home",
        _ => "@",
    }
}

#[test]
fn every_member_is_registered() {
    let registry = registry();
    assert!(registry.missing_providers().is_empty());
    assert_eq!(registry.list_providers(), ProviderId::all().collect::<Vec<_>>());
}

#[test]
fn every_provider_constructs() {
    let registry = registry();
    for provider in ProviderId::all() {
        let settings = registry
            .create(provider.as_str(), &valid_options(provider), "example.com", host_for(provider), IpVersion::Ipv4)
            .unwrap_or_else(|e| panic!("{provider}: {e}"));
        assert_eq!(settings.provider(), provider);
        assert_eq!(settings.domain(), "example.com");
    }
}

#[test]
fn empty_options_fail_validation() {
    let registry = registry();
    for provider in ProviderId::all() {
        let err = registry
            .create(provider.as_str(), &json!({}), "example.com", host_for(provider), IpVersion::Ipv4)
            .expect_err("empty options are invalid");
        assert!(matches!(err, Error::Validation { .. }), "{provider}: {err:?}");
    }
}

#[test]
fn unknown_token() {
    let err = registry()
        .create("nonexistent", &json!({}), "example.com", "@", IpVersion::Ipv4)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownProvider(token) if token == "nonexistent"));
}

#[test]
fn duplicate_registration() {
    let mut registry = ProviderRegistry::new();
    registry
        .register(ProviderId::Dd24, ddns_providers::constructor(ProviderId::Dd24))
        .unwrap();
    let err = registry
        .register(ProviderId::Dd24, ddns_providers::constructor(ProviderId::Dd24))
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateProvider(ProviderId::Dd24)));
}
