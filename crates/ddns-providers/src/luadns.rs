//! LuaDNS REST API

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::types::record_type;
use ddns_core::{Error, IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const API_BASE: &str = "https://api.luadns.com/v1";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::Status(401), Verdict::AuthFailed),
    rule(Marker::Status(429), Verdict::RateLimited),
    rule(Marker::NonSuccess, Verdict::BadStatus),
];

#[derive(Deserialize)]
#[serde(default)]
struct Options {
    email: String,
    token: String,
    zone_id: u64,
    record_id: u64,
    ttl: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            email: String::new(),
            token: String::new(),
            zone_id: 0,
            record_id: 0,
            ttl: 300,
        }
    }
}

#[derive(Serialize)]
struct UpdateRequest {
    name: String,
    #[serde(rename = "type")]
    record_type: &'static str,
    content: String,
    ttl: u32,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    content: String,
}

#[derive(Debug)]
pub struct LuaDns {
    target: RecordTarget,
    email: String,
    token: SecretString,
    zone_id: u64,
    record_id: u64,
    ttl: u32,
}

/// Build LuaDNS settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Luadns;
    let options: Options = decode_options(provider, options)?;
    require(provider, "email", &options.email)?;
    require(provider, "token", &options.token)?;
    if options.zone_id == 0 {
        return Err(Error::validation(provider, "zone_id", "must be set"));
    }
    if options.record_id == 0 {
        return Err(Error::validation(provider, "record_id", "must be set"));
    }

    Ok(Box::new(LuaDns {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        email: options.email,
        token: SecretString::from(options.token),
        zone_id: options.zone_id,
        record_id: options.record_id,
        ttl: options.ttl,
    }))
}

impl LuaDns {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Luadns;
        let zone_id = self.zone_id.to_string();
        let record_id = self.record_id.to_string();
        let url = common::endpoint_with_path(provider, API_BASE, &["zones", zone_id.as_str(), "records", record_id.as_str()])?;

        // LuaDNS record names are absolute
        let payload = UpdateRequest {
            name: format!("{}.", self.build_domain_name()),
            record_type: record_type(ip),
            content: ip.to_string(),
            ttl: self.ttl,
        };
        let request = transport
            .request(Method::PUT, url)
            .basic_auth(&self.email, Some(self.token.expose_secret()))
            .header(ACCEPT, "application/json")
            .json(&payload);

        let response = transport.execute(provider, cancel, request).await?;
        if let Some(acceptance) = common::screen(provider, RULES, &response)? {
            return Ok(common::outcome(acceptance, ip));
        }

        let record: RecordResponse = common::decode_json(provider, &response)?;
        let echoed = common::parse_ip(provider, &record.content)?;
        let effective = classify::confirm_ip(provider, Some(echoed), ip, false)?;
        Ok(UpdateOutcome::Updated { ip: effective })
    }
}

#[async_trait]
impl Settings for LuaDns {
    fn provider(&self) -> ProviderId {
        ProviderId::Luadns
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
