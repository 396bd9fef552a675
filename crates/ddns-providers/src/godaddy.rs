//! GoDaddy domains API v1

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require_match};
use ddns_core::types::record_type;
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const API_BASE: &str = "https://api.godaddy.com/v1";

const KEY_PATTERN: &str = "^[A-Za-z0-9]{8,14}_[A-Za-z0-9]{21,22}$";
const SECRET_PATTERN: &str = "^[A-Za-z0-9]{22}$";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::Status(200), Verdict::Updated),
    rule(Marker::Status(401), Verdict::AuthFailed),
    rule(Marker::Status(403), Verdict::AuthFailed),
    rule(Marker::Status(429), Verdict::RateLimited),
    rule(Marker::NonSuccess, Verdict::BadStatus),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    key: String,
    secret: String,
}

#[derive(Serialize)]
struct RecordData {
    data: String,
}

#[derive(Debug)]
pub struct GoDaddy {
    target: RecordTarget,
    key: SecretString,
    secret: SecretString,
}

/// Build GoDaddy settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Godaddy;
    let options: Options = decode_options(provider, options)?;
    require_match(provider, "key", &options.key, KEY_PATTERN)?;
    require_match(provider, "secret", &options.secret, SECRET_PATTERN)?;

    Ok(Box::new(GoDaddy {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        key: SecretString::from(options.key),
        secret: SecretString::from(options.secret),
    }))
}

impl GoDaddy {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Godaddy;
        let url = common::endpoint_with_path(
            provider,
            API_BASE,
            &["domains", self.domain(), "records", record_type(ip), self.host()],
        )?;

        let authorization = format!(
            "sso-key {}:{}",
            self.key.expose_secret(),
            self.secret.expose_secret()
        );
        let request = transport
            .request(Method::PUT, url)
            .header(AUTHORIZATION, authorization)
            .json(&[RecordData { data: ip.to_string() }]);

        let response = transport.execute(provider, cancel, request).await?;
        let acceptance = classify::evaluate(provider, RULES, &response)?;
        Ok(common::outcome(acceptance, ip))
    }
}

#[async_trait]
impl Settings for GoDaddy {
    fn provider(&self) -> ProviderId {
        ProviderId::Godaddy
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
    use ddns_core::Error;
    use serde_json::json;

    const KEY: &str = "dKNk7ms8Gp_4Kt3vZ2Lgo1Qsc2aQCaVc";
    const SECRET: &str = "4XmKjRLQmFGE6pV3wQ6r1Z";

    #[test]
    fn test_credential_formats() {
        assert!(construct(&json!({"key": KEY, "secret": SECRET}), "example.com", "@", IpVersion::Ipv4).is_ok());

        let err = construct(&json!({"key": "bad", "secret": SECRET}), "example.com", "@", IpVersion::Ipv4).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "key", .. }));

        let err = construct(&json!({"key": KEY, "secret": "bad"}), "example.com", "@", IpVersion::Ipv4).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "secret", .. }));
    }
}
