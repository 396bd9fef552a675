//! Dreamhost API
//!
//! One `dns-add_record` call per update; the API answers with
//! `{"result": ..., "data": ...}`.

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{Acceptance, Marker, Rejection, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require_match};
use ddns_core::types::record_type;
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const API_URL: &str = "https://api.dreamhost.com/";

const KEY_PATTERN: &str = "^[a-zA-Z0-9]{16}$";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[rule(Marker::NonSuccess, Verdict::BadStatus)];

/// Rules for the `data` field of a failed call
pub const DATA_RULES: &[Rule] = &[
    rule(Marker::Contains("invalid_api_key"), Verdict::AuthFailed),
    rule(Marker::StartsWith("record_already_exists"), Verdict::Rejected(Rejection::Conflict)),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    key: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    result: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug)]
pub struct Dreamhost {
    target: RecordTarget,
    key: SecretString,
}

/// Build Dreamhost settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Dreamhost;
    let options: Options = decode_options(provider, options)?;
    require_match(provider, "key", &options.key, KEY_PATTERN)?;

    Ok(Box::new(Dreamhost {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        key: SecretString::from(options.key),
    }))
}

impl Dreamhost {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Dreamhost;
        let mut url = common::endpoint(provider, API_URL)?;
        url.query_pairs_mut()
            .append_pair("key", self.key.expose_secret())
            .append_pair("unique_id", &Uuid::new_v4().to_string())
            .append_pair("format", "json")
            .append_pair("cmd", "dns-add_record")
            .append_pair("record", &self.build_domain_name())
            .append_pair("type", record_type(ip))
            .append_pair("value", &ip.to_string());

        let request = transport.request(Method::GET, url);
        let response = transport.execute(provider, cancel, request).await?;
        if let Some(acceptance) = common::screen(provider, RULES, &response)? {
            return Ok(common::outcome(acceptance, ip));
        }

        let body: ApiResponse = common::decode_json(provider, &response)?;
        let acceptance = if body.result == "success" {
            Acceptance::Updated
        } else {
            common::classify_field(provider, DATA_RULES, &body.data)?
        };
        Ok(common::outcome(acceptance, ip))
    }
}

#[async_trait]
impl Settings for Dreamhost {
    fn provider(&self) -> ProviderId {
        ProviderId::Dreamhost
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
