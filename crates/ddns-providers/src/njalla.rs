//! Njalla dynamic DNS
//!
//! Njalla answers with a JSON document whose `status` field carries the
//! real outcome:
//!
//! ```json
//! {"status": 200, "message": "record updated", "value": {"A": "1.2.3.4"}}
//! ```

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rejection, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{HttpResponse, IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const UPDATE_URL: &str = "https://njal.la/update/";

/// HTTP status rules
pub const RULES: &[Rule] = &[rule(Marker::NonSuccess, Verdict::BadStatus)];

/// Rules for the `status` field of the body
pub const STATUS_RULES: &[Rule] = &[
    rule(Marker::Equals("200"), Verdict::Updated),
    rule(Marker::Equals("401"), Verdict::AuthFailed),
    rule(Marker::Equals("500"), Verdict::Rejected(Rejection::ServerSide)),
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    key: String,
    provider_ip: bool,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    status: u16,
    #[serde(default)]
    message: String,
    #[serde(default)]
    value: Option<RecordValue>,
}

#[derive(Debug, Default, Deserialize)]
struct RecordValue {
    #[serde(rename = "A")]
    a: Option<String>,
    #[serde(rename = "AAAA")]
    aaaa: Option<String>,
}

#[derive(Debug)]
pub struct Njalla {
    target: RecordTarget,
    key: SecretString,
    use_provider_ip: bool,
}

/// Build Njalla settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Njalla;
    let options: Options = decode_options(provider, options)?;
    require(provider, "key", &options.key)?;

    Ok(Box::new(Njalla {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        key: SecretString::from(options.key),
        use_provider_ip: options.provider_ip,
    }))
}

impl Njalla {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Njalla;
        let mut url = common::endpoint(provider, UPDATE_URL)?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("h", &self.build_domain_name())
                .append_pair("k", self.key.expose_secret());
            if self.use_provider_ip {
                query.append_pair("auto", "");
            } else {
                let key = if ip.is_ipv6() { "aaaa" } else { "a" };
                query.append_pair(key, &ip.to_string());
            }
        }

        let request = transport.request(Method::GET, url);
        let response = transport.execute(provider, cancel, request).await?;
        if let Some(acceptance) = common::screen(provider, RULES, &response)? {
            return Ok(common::outcome(acceptance, ip));
        }

        let body: UpdateResponse = common::decode_json(provider, &response)?;
        // the body status stands in for the HTTP status, the message for the body
        let reported = HttpResponse::new(body.status, body.message);
        let verdict = match classify::classify(STATUS_RULES, 200, &body.status.to_string()) {
            Verdict::Unknown => Verdict::BadStatus,
            verdict => verdict,
        };
        let acceptance = classify::into_acceptance(provider, verdict, &reported)?;

        let value = body.value.unwrap_or_default();
        let echoed = if ip.is_ipv6() { value.aaaa } else { value.a };
        let echoed = echoed
            .filter(|text| !text.is_empty())
            .map(|text| common::parse_ip(provider, &text))
            .transpose()?;
        let effective = classify::confirm_ip(provider, echoed, ip, self.use_provider_ip)?;
        Ok(common::outcome(acceptance, effective))
    }
}

#[async_trait]
impl Settings for Njalla {
    fn provider(&self) -> ProviderId {
        ProviderId::Njalla
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
