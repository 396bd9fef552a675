//! Strato DynDNS
//!
//! The record's own name is the basic auth user.

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
    dyndns::BADAUTH,
    dyndns::BADAGENT,
    dyndns::ABUSE,
    dyndns::DNSERR,
    dyndns::SERVER_ERROR,
    dyndns::NOCHG,
    dyndns::GOOD,
];

static PROFILE: Profile = Profile {
    update_url: "https://dyndns.strato.com/nic/update",
    extra_query: &[],
    password_in_query: false,
    rules: RULES,
};

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    password: String,
    provider_ip: bool,
}

/// Build Strato settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Strato;
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

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::Error;
    use serde_json::json;

    #[test]
    fn test_missing_password() {
        let err = construct(&json!({}), "example.com", "@", IpVersion::Ipv4).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "password", .. }));
    }
}
