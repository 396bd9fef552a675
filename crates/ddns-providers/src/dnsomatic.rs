//! DNS-O-Matic
//!
//! dyndns2 clone which also resets the wildcard and MX flags.

use crate::dyndns::{self, DynDns2, Profile};
use ddns_core::classify::{Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings};
use secrecy::SecretString;
use serde::Deserialize;

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    dyndns::NOHOST,
    dyndns::NOTFQDN,
    dyndns::BADREQUEST,
    dyndns::BADAUTH,
    dyndns::BADAGENT,
    dyndns::ABUSE,
    dyndns::DNSERR,
    dyndns::SERVER_ERROR,
    dyndns::NOCHG,
    dyndns::GOOD,
];

static PROFILE: Profile = Profile {
    update_url: "https://updates.dnsomatic.com/nic/update",
    extra_query: &[("wildcard", "NOCHG"), ("mx", "NOCHG"), ("backmx", "NOCHG")],
    password_in_query: false,
    rules: RULES,
};

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    username: String,
    password: String,
    provider_ip: bool,
}

/// Build DNS-O-Matic settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Dnsomatic;
    let options: Options = decode_options(provider, options)?;
    require(provider, "username", &options.username)?;
    require(provider, "password", &options.password)?;

    let target = RecordTarget::new(provider, domain, host, ip_version)?;
    Ok(Box::new(DynDns2::new(
        provider,
        &PROFILE,
        target,
        options.username,
        SecretString::from(options.password),
        options.provider_ip,
    )))
}
