//! No-IP dynamic DNS

use crate::dyndns::{self, DynDns2, Profile};
use ddns_core::classify::{Marker, Rejection, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{Error, IpVersion, ProviderId, RecordTarget, Result, Settings};
use secrecy::SecretString;
use serde::Deserialize;

/// Longest username No-IP accepts
const MAX_USERNAME_LEN: usize = 50;

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::Status(401), Verdict::AuthFailed),
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    dyndns::SERVER_ERROR,
    dyndns::ABUSE,
    dyndns::keyword("!donator", Verdict::Rejected(Rejection::FeatureUnavailable)),
    dyndns::BADAGENT,
    dyndns::BADAUTH,
    dyndns::NOHOST,
    dyndns::NOCHG,
    dyndns::GOOD,
];

static PROFILE: Profile = Profile {
    update_url: "https://dynupdate.no-ip.com/nic/update",
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

/// Build No-IP settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Noip;
    let options: Options = decode_options(provider, options)?;
    require(provider, "username", &options.username)?;
    if options.username.chars().count() > MAX_USERNAME_LEN {
        return Err(Error::validation(
            provider,
            "username",
            format!("longer than {MAX_USERNAME_LEN} characters"),
        ));
    }
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
