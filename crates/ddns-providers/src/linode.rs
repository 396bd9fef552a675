//! Linode domains API v4

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{Error, IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const API_BASE: &str = "https://api.linode.com/v4";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::Status(401), Verdict::AuthFailed),
    rule(Marker::Status(429), Verdict::RateLimited),
    rule(Marker::NonSuccess, Verdict::BadStatus),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    token: String,
    domain_id: u64,
    record_id: u64,
}

#[derive(Serialize)]
struct UpdateRequest {
    target: String,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    target: String,
}

#[derive(Debug)]
pub struct Linode {
    target: RecordTarget,
    token: SecretString,
    domain_id: u64,
    record_id: u64,
}

/// Build Linode settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Linode;
    let options: Options = decode_options(provider, options)?;
    require(provider, "token", &options.token)?;
    if options.domain_id == 0 {
        return Err(Error::validation(provider, "domain_id", "must be set"));
    }
    if options.record_id == 0 {
        return Err(Error::validation(provider, "record_id", "must be set"));
    }

    Ok(Box::new(Linode {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        token: SecretString::from(options.token),
        domain_id: options.domain_id,
        record_id: options.record_id,
    }))
}

impl Linode {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Linode;
        let domain_id = self.domain_id.to_string();
        let record_id = self.record_id.to_string();
        let url = common::endpoint_with_path(provider, API_BASE, &["domains", domain_id.as_str(), "records", record_id.as_str()])?;

        let request = transport
            .request(Method::PUT, url)
            .bearer_auth(self.token.expose_secret())
            .json(&UpdateRequest { target: ip.to_string() });

        let response = transport.execute(provider, cancel, request).await?;
        if let Some(acceptance) = common::screen(provider, RULES, &response)? {
            return Ok(common::outcome(acceptance, ip));
        }

        let record: RecordResponse = common::decode_json(provider, &response)?;
        let echoed = common::parse_ip(provider, &record.target)?;
        let effective = classify::confirm_ip(provider, Some(echoed), ip, false)?;
        Ok(UpdateOutcome::Updated { ip: effective })
    }
}

#[async_trait]
impl Settings for Linode {
    fn provider(&self) -> ProviderId {
        ProviderId::Linode
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
    use serde_json::json;

    #[test]
    fn test_ids_required() {
        let err = construct(&json!({"token": "t", "record_id": 1}), "example.com", "@", IpVersion::Ipv4).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "domain_id", .. }));
        let err = construct(&json!({"token": "t", "domain_id": 1}), "example.com", "@", IpVersion::Ipv4).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "record_id", .. }));
    }
}
