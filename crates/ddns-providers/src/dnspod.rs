//! DNSPod (dnsapi.cn)
//!
//! `Record.Ddns` rewrites an existing record in place. The HTTP status is
//! 200 for most failures, so the outcome is read from `status.code`.

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const UPDATE_URL: &str = "https://dnsapi.cn/Record.Ddns";

const DEFAULT_RECORD_LINE: &str = "默认";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[rule(Marker::NonSuccess, Verdict::BadStatus)];

/// Rules for `status.code`
pub const STATUS_RULES: &[Rule] = &[
    rule(Marker::Equals("1"), Verdict::Updated),
    rule(Marker::Equals("-1"), Verdict::AuthFailed),
    rule(Marker::Equals("10001"), Verdict::AuthFailed),
    rule(Marker::Equals("-2"), Verdict::RateLimited),
    rule(Marker::Equals("-8"), Verdict::RateLimited),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    token: String,
    record_id: String,
    record_line: String,
}

#[derive(Deserialize)]
struct DdnsResponse {
    status: Status,
    record: Option<Record>,
}

#[derive(Deserialize)]
struct Status {
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct Record {
    #[serde(default)]
    value: String,
}

#[derive(Debug)]
pub struct Dnspod {
    target: RecordTarget,
    token: SecretString,
    record_id: String,
    record_line: String,
}

/// Build DNSPod settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Dnspod;
    let options: Options = decode_options(provider, options)?;
    require(provider, "token", &options.token)?;
    require(provider, "record_id", &options.record_id)?;

    let record_line = if options.record_line.is_empty() {
        DEFAULT_RECORD_LINE.to_string()
    } else {
        options.record_line
    };

    Ok(Box::new(Dnspod {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        token: SecretString::from(options.token),
        record_id: options.record_id,
        record_line,
    }))
}

impl Dnspod {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Dnspod;
        let url = common::endpoint(provider, UPDATE_URL)?;
        let value = ip.to_string();
        let form = [
            ("login_token", self.token.expose_secret()),
            ("format", "json"),
            ("domain", self.domain()),
            ("record_id", self.record_id.as_str()),
            ("sub_domain", self.host()),
            ("record_line", self.record_line.as_str()),
            ("value", value.as_str()),
        ];

        let request = transport.request(Method::POST, url).form(&form);
        let response = transport.execute(provider, cancel, request).await?;
        if let Some(acceptance) = common::screen(provider, RULES, &response)? {
            return Ok(common::outcome(acceptance, ip));
        }

        let body: DdnsResponse = common::decode_json(provider, &response)?;
        if body.status.code != "1" {
            tracing::debug!(code = %body.status.code, message = %body.status.message, "DNSPod refused update");
        }
        let acceptance = common::classify_field(provider, STATUS_RULES, &body.status.code)?;

        let echoed = match body.record {
            Some(record) if !record.value.is_empty() => Some(common::parse_ip(provider, &record.value)?),
            _ => None,
        };
        let effective = classify::confirm_ip(provider, echoed, ip, false)?;
        Ok(common::outcome(acceptance, effective))
    }
}

#[async_trait]
impl Settings for Dnspod {
    fn provider(&self) -> ProviderId {
        ProviderId::Dnspod
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
