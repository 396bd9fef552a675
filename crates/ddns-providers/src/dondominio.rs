//! DonDominio simple API
//!
//! Only root records can be updated; the API sets glue records on the
//! domain itself.

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rejection, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::types::ROOT_HOST;
use ddns_core::{Error, IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const UPDATE_URL: &str = "https://simple-api.dondominio.net";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[rule(Marker::NonSuccess, Verdict::BadStatus)];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    username: String,
    password: String,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    success: bool,
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_code_msg: String,
    response_data: Option<ResponseData>,
}

#[derive(Deserialize)]
struct ResponseData {
    #[serde(default)]
    gluerecords: Vec<GlueRecord>,
}

#[derive(Deserialize)]
struct GlueRecord {
    #[serde(default)]
    ipv4: String,
    #[serde(default)]
    ipv6: String,
}

#[derive(Debug)]
pub struct DonDominio {
    target: RecordTarget,
    username: String,
    password: SecretString,
    name: String,
}

/// Build DonDominio settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Dondominio;
    let options: Options = decode_options(provider, options)?;
    require(provider, "username", &options.username)?;
    require(provider, "password", &options.password)?;
    require(provider, "name", &options.name)?;
    if host != ROOT_HOST {
        return Err(Error::validation(provider, "host", "only the root host @ is supported"));
    }

    Ok(Box::new(DonDominio {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        username: options.username,
        password: SecretString::from(options.password),
        name: options.name,
    }))
}

impl DonDominio {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Dondominio;
        let url = common::endpoint(provider, UPDATE_URL)?;
        let address_key = if ip.is_ipv4() { "ipv4" } else { "ipv6" };
        let address = ip.to_string();
        let form = [
            ("apiuser", self.username.as_str()),
            ("apipasswd", self.password.expose_secret()),
            ("domain", self.domain()),
            ("name", self.name.as_str()),
            (address_key, address.as_str()),
        ];

        let request = transport.request(Method::POST, url).form(&form);
        let response = transport.execute(provider, cancel, request).await?;
        if let Some(acceptance) = common::screen(provider, RULES, &response)? {
            return Ok(common::outcome(acceptance, ip));
        }

        let body: ApiResponse = common::decode_json(provider, &response)?;
        if !body.success {
            return Err(Error::rejected(
                provider,
                Rejection::Unsuccessful,
                format!("{} (error code {})", body.error_code_msg, body.error_code),
            ));
        }

        let glue = body
            .response_data
            .and_then(|data| data.gluerecords.into_iter().next())
            .ok_or_else(|| Error::malformed(provider, "no glue record in response"))?;
        let echoed = if ip.is_ipv4() { glue.ipv4 } else { glue.ipv6 };
        let echoed = common::parse_ip(provider, &echoed)?;
        let effective = classify::confirm_ip(provider, Some(echoed), ip, false)?;
        Ok(UpdateOutcome::Updated { ip: effective })
    }
}

#[async_trait]
impl Settings for DonDominio {
    fn provider(&self) -> ProviderId {
        ProviderId::Dondominio
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
