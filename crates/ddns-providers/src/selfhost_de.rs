//! selfHOST.de dynamic DNS

use crate::dyndns::{self, DynDns2, Profile};
use ddns_core::classify::{Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings};
use secrecy::SecretString;
use serde::Deserialize;

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::Status(401), Verdict::AuthFailed),
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    dyndns::NOTFQDN,
    dyndns::BADREQUEST,
    dyndns::BADAUTH,
    dyndns::NOCHG,
    dyndns::GOOD,
];

static PROFILE: Profile = Profile {
    update_url: "https://carol.selfhost.de/nic/update",
    extra_query: &[],
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

/// Build selfHOST.de settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::SelfhostDe;
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
