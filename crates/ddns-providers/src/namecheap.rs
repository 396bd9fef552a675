//! Namecheap dynamic DNS
//!
//! The response is an XML document:
//!
//! ```xml
//! <interface-response>
//!   <Command>SETDNSHOST</Command>
//!   <IP>1.2.3.4</IP>
//!   <ErrCount>0</ErrCount>
//!   <Done>true</Done>
//! </interface-response>
//! ```
//!
//! Namecheap dynamic DNS has no IPv6 support.

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rejection, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require_match};
use ddns_core::{Error, IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use regex::Regex;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const UPDATE_URL: &str = "https://dynamicdns.park-your-domain.com/update";

const PASSWORD_PATTERN: &str = "^[a-f0-9]{32}$";

/// Address echoed in the response
const ECHOED_IP_PATTERN: &str = r"(?i)<ip>\s*([^<\s]+)\s*</ip>";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    rule(Marker::Contains("passwords do not match"), Verdict::AuthFailed),
    rule(Marker::Contains("<errcount>0</errcount>"), Verdict::Updated),
    rule(Marker::Contains("<err1>"), Verdict::Rejected(Rejection::Unsuccessful)),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    password: String,
    provider_ip: bool,
}

#[derive(Debug)]
pub struct Namecheap {
    target: RecordTarget,
    password: SecretString,
    use_provider_ip: bool,
}

/// Build Namecheap settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Namecheap;
    let options: Options = decode_options(provider, options)?;
    require_match(provider, "password", &options.password, PASSWORD_PATTERN)?;
    if ip_version == IpVersion::Ipv6 {
        return Err(Error::validation(provider, "ip_version", "IPv6 is not supported"));
    }

    Ok(Box::new(Namecheap {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        password: SecretString::from(options.password),
        use_provider_ip: options.provider_ip,
    }))
}

/// Address in the `<IP>` element of a response body
fn echoed_ip(body: &str) -> Result<Option<IpAddr>> {
    let pattern = Regex::new(ECHOED_IP_PATTERN)
        .map_err(|e| Error::config(format!("namecheap: invalid pattern: {e}")))?;
    let Some(captures) = pattern.captures(body) else {
        return Ok(None);
    };
    common::parse_ip(ProviderId::Namecheap, &captures[1]).map(Some)
}

impl Namecheap {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        if ip.is_ipv6() {
            return Err(Error::rejected(
                ProviderId::Namecheap,
                Rejection::BadRequest,
                format!("IPv6 address {ip} is not supported"),
            ));
        }

        let mut url = common::endpoint(ProviderId::Namecheap, UPDATE_URL)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("host", self.host())
                .append_pair("domain", self.domain())
                .append_pair("password", self.password.expose_secret());
            if !self.use_provider_ip {
                query.append_pair("ip", &ip.to_string());
            }
        }

        let request = transport.request(Method::GET, url);
        let response = transport.execute(ProviderId::Namecheap, cancel, request).await?;
        let acceptance = classify::evaluate(ProviderId::Namecheap, RULES, &response)?;
        let effective = classify::confirm_ip(
            ProviderId::Namecheap,
            echoed_ip(&response.body)?,
            ip,
            self.use_provider_ip,
        )?;
        Ok(common::outcome(acceptance, effective))
    }
}

#[async_trait]
impl Settings for Namecheap {
    fn provider(&self) -> ProviderId {
        ProviderId::Namecheap
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
    use serde_json::json;

    const PASSWORD: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_password_format() {
        let err = construct(&json!({"password": "short"}), "example.com", "@", IpVersion::Ipv4).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "password", .. }));
        assert!(construct(&json!({"password": PASSWORD}), "example.com", "@", IpVersion::Ipv4).is_ok());
    }

    #[test]
    fn test_ipv6_rejected_at_construction() {
        let err = construct(&json!({"password": PASSWORD}), "example.com", "@", IpVersion::Ipv6).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "ip_version", .. }));
    }

    #[test]
    fn test_echoed_ip() {
        let body = "<interface-response><IP>1.2.3.4</IP><ErrCount>0</ErrCount></interface-response>";
        assert_eq!(echoed_ip(body).unwrap(), Some("1.2.3.4".parse().unwrap()));
        assert_eq!(echoed_ip("<ErrCount>0</ErrCount>").unwrap(), None);
        assert!(matches!(
            echoed_ip("<IP>garbage</IP>").unwrap_err(),
            Error::MalformedResponse { .. }
        ));
    }

    #[test]
    fn test_rules() {
        let ok = "<?xml version=\"1.0\"?><interface-response><ErrCount>0</ErrCount></interface-response>";
        assert_eq!(classify(RULES, 200, ok), Verdict::Updated);
        let denied = "<ErrCount>1</ErrCount><errors><Err1>Passwords do not match</Err1></errors>";
        assert_eq!(classify(RULES, 200, denied), Verdict::AuthFailed);
        let other = "<ErrCount>1</ErrCount><errors><Err1>Domain name not found</Err1></errors>";
        assert_eq!(classify(RULES, 200, other), Verdict::Rejected(Rejection::Unsuccessful));
    }
}
