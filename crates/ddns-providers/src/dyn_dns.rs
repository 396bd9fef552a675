//! Dyn (Oracle) remote access API

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
    dyndns::NOTFQDN,
    dyndns::NOHOST,
    dyndns::NUMHOST,
    dyndns::ABUSE,
    dyndns::BADAGENT,
    dyndns::DNSERR,
    dyndns::SERVER_ERROR,
    dyndns::NOCHG,
    dyndns::GOOD,
];

static PROFILE: Profile = Profile {
    update_url: "https://members.dyndns.org/v3/update",
    extra_query: &[],
    password_in_query: false,
    rules: RULES,
};

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    username: String,
    /// Updater client key, used in place of the account password
    client_key: String,
    provider_ip: bool,
}

/// Build Dyn settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Dyn;
    let options: Options = decode_options(provider, options)?;
    require(provider, "username", &options.username)?;
    require(provider, "client_key", &options.client_key)?;

    let target = RecordTarget::new(provider, domain, host, ip_version)?;
    Ok(Box::new(DynDns2::new(
        provider,
        &PROFILE,
        target,
        options.username,
        SecretString::from(options.client_key),
        options.provider_ip,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::Error;
    use ddns_core::classify::{Rejection, classify};
    use serde_json::json;

    #[test]
    fn test_requires_client_key() {
        let err = construct(&json!({"username": "u", "password": "p"}), "example.com", "@", IpVersion::Ipv4)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "client_key", .. }));
    }

    #[test]
    fn test_rules() {
        assert_eq!(classify(RULES, 200, "numhost"), Verdict::Rejected(Rejection::TooManyHosts));
        assert_eq!(classify(RULES, 200, "dnserr"), Verdict::Rejected(Rejection::ServerSide));
        assert_eq!(classify(RULES, 200, "good 1.2.3.4"), Verdict::Updated);
        assert_eq!(classify(RULES, 200, "fine"), Verdict::Unknown);
    }
}
