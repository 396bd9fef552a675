//! DigitalOcean domain records API
//!
//! Updates the record identified by `record_id`; records are not looked up
//! by name.

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::types::record_type;
use ddns_core::{Error, IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const API_BASE: &str = "https://api.digitalocean.com/v2";

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
    record_id: u64,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    domain_record: DomainRecord,
}

#[derive(Debug, Deserialize)]
struct DomainRecord {
    data: String,
}

#[derive(Debug)]
pub struct DigitalOcean {
    target: RecordTarget,
    token: SecretString,
    record_id: u64,
}

/// Build DigitalOcean settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Digitalocean;
    let options: Options = decode_options(provider, options)?;
    require(provider, "token", &options.token)?;
    if options.record_id == 0 {
        return Err(Error::validation(provider, "record_id", "must be set"));
    }

    Ok(Box::new(DigitalOcean {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        token: SecretString::from(options.token),
        record_id: options.record_id,
    }))
}

impl DigitalOcean {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Digitalocean;
        let record_id = self.record_id.to_string();
        let url = common::endpoint_with_path(provider, API_BASE, &["domains", self.domain(), "records", record_id.as_str()])?;

        let payload = UpdateRequest {
            record_type: record_type(ip),
            name: self.host(),
            data: ip.to_string(),
        };
        let request = transport
            .request(Method::PUT, url)
            .bearer_auth(self.token.expose_secret())
            .json(&payload);

        let response = transport.execute(provider, cancel, request).await?;
        if let Some(acceptance) = common::screen(provider, RULES, &response)? {
            return Ok(common::outcome(acceptance, ip));
        }

        let body: UpdateResponse = common::decode_json(provider, &response)?;
        let echoed = common::parse_ip(provider, &body.domain_record.data)?;
        let effective = classify::confirm_ip(provider, Some(echoed), ip, false)?;
        Ok(UpdateOutcome::Updated { ip: effective })
    }
}

#[async_trait]
impl Settings for DigitalOcean {
    fn provider(&self) -> ProviderId {
        ProviderId::Digitalocean
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
    fn test_record_id_required() {
        let err = construct(&json!({"token": "t"}), "example.com", "@", IpVersion::Ipv4).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "record_id", .. }));
        assert!(construct(&json!({"token": "t", "record_id": 42}), "example.com", "@", IpVersion::Ipv4).is_ok());
    }

    #[test]
    fn test_record_id_type_checked() {
        let err = construct(&json!({"token": "t", "record_id": "abc"}), "example.com", "@", IpVersion::Ipv4)
            .unwrap_err();
        assert!(matches!(err, Error::Validation { field: "options", .. }));
    }
}
