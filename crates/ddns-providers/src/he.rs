//! Hurricane Electric dynamic DNS
//!
//! The record's own name is the basic auth user and its dynamic key the
//! password; the key is also sent as a query parameter.

use crate::dyndns::{self, DynDns2, Profile};
use ddns_core::classify::{Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings};
use secrecy::SecretString;
use serde::Deserialize;

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    dyndns::BADAUTH,
    dyndns::NOCHG,
    dyndns::GOOD,
];

static PROFILE: Profile = Profile {
    update_url: "https://dyn.dns.he.net/nic/update",
    extra_query: &[],
    password_in_query: true,
    rules: RULES,
};

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    password: String,
    provider_ip: bool,
}

/// Build Hurricane Electric settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::He;
    let options: Options = decode_options(provider, options)?;
    require(provider, "password", &options.password)?;

    let target = RecordTarget::new(provider, domain, host, ip_version)?;
    let username = target.fqdn();
    Ok(Box::new(DynDns2::new(
        provider,
        &PROFILE,
        target,
        username,
        SecretString::from(options.password),
        options.provider_ip,
    )))
}
