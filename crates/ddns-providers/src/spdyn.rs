//! Securepoint Dynamic DNS (spdyn)
//!
//! Authenticates either with an update token, sent with the record name as
//! user, or with the account's username and password. Credentials travel
//! in the query string.

use crate::common;
use crate::dyndns;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rejection, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require};
use ddns_core::{IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

const UPDATE_URL: &str = "https://update.spdyn.de/nic/update";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::StatusNot(200), Verdict::BadStatus),
    dyndns::ABUSE,
    dyndns::BADAUTH,
    dyndns::keyword("!yours", Verdict::Rejected(Rejection::NotOwned)),
    dyndns::NOHOST,
    dyndns::keyword("fatal", Verdict::Rejected(Rejection::Unsuccessful)),
    dyndns::NOTFQDN,
    dyndns::NUMHOST,
    dyndns::NOCHG,
    dyndns::GOOD,
];

#[derive(Default, Deserialize)]
#[serde(default)]
struct Options {
    user: String,
    password: String,
    token: String,
    provider_ip: bool,
}

#[derive(Debug)]
pub struct Spdyn {
    target: RecordTarget,
    user: String,
    secret: SecretString,
    use_provider_ip: bool,
}

/// Build spdyn settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Spdyn;
    let options: Options = decode_options(provider, options)?;
    let target = RecordTarget::new(provider, domain, host, ip_version)?;

    let (user, secret) = if options.token.is_empty() {
        require(provider, "user", &options.user)?;
        require(provider, "password", &options.password)?;
        (options.user, options.password)
    } else {
        (target.fqdn(), options.token)
    };

    Ok(Box::new(Spdyn {
        target,
        user,
        secret: SecretString::from(secret),
        use_provider_ip: options.provider_ip,
    }))
}

impl Spdyn {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let mut url = common::endpoint(ProviderId::Spdyn, UPDATE_URL)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("hostname", &self.build_domain_name());
            if !self.use_provider_ip {
                query.append_pair("myip", &ip.to_string());
            }
            query
                .append_pair("user", &self.user)
                .append_pair("pass", self.secret.expose_secret());
        }

        let request = transport.request(Method::GET, url);
        let response = transport.execute(ProviderId::Spdyn, cancel, request).await?;
        let acceptance = classify::evaluate(ProviderId::Spdyn, RULES, &response)?;
        common::echoed_outcome(ProviderId::Spdyn, acceptance, &response, ip, self.use_provider_ip)
    }
}

#[async_trait]
impl Settings for Spdyn {
    fn provider(&self) -> ProviderId {
        ProviderId::Spdyn
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
