//! # Cloudflare DNS Provider
//!
//! Updates one existing record through the Cloudflare API v4.
//!
//! ## Security Requirements
//!
//! - Credentials NEVER appear in logs or `Debug` output
//! - Construction fails fast if no authentication method is configured
//!
//! ## Authentication
//!
//! Exactly one of:
//! - `token`: API token with Zone:DNS:Edit permission (Bearer)
//! - `user_service_key`: Origin CA user service key
//! - `email` + `key`: Global API key of the account
//!
//! ## API Reference
//!
//! - Cloudflare API v4: https://developers.cloudflare.com/api/
//! - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rejection, Rule, Verdict, rule};
use ddns_core::config::{decode_options, require, require_match};
use ddns_core::types::record_type;
use ddns_core::{Error, IpVersion, ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

/// Cloudflare API base URL
const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Response rules, checked in order
pub const RULES: &[Rule] = &[
    rule(Marker::Status(401), Verdict::AuthFailed),
    rule(Marker::Status(403), Verdict::AuthFailed),
    rule(Marker::Status(429), Verdict::RateLimited),
    rule(Marker::NonSuccess, Verdict::BadStatus),
];

#[derive(Deserialize)]
#[serde(default)]
struct Options {
    zone_identifier: String,
    identifier: String,
    token: String,
    user_service_key: String,
    email: String,
    key: String,
    proxied: bool,
    ttl: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            zone_identifier: String::new(),
            identifier: String::new(),
            token: String::new(),
            user_service_key: String::new(),
            email: String::new(),
            key: String::new(),
            proxied: false,
            // 1 means automatic
            ttl: 1,
        }
    }
}

/// How requests authenticate
#[derive(Debug)]
enum Auth {
    Token(SecretString),
    UserServiceKey(SecretString),
    GlobalKey { email: String, key: SecretString },
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    content: String,
    proxied: bool,
    ttl: u32,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<RecordResult>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RecordResult {
    content: String,
}

/// Cloudflare settings
///
/// # Security
///
/// Every credential is a [`SecretString`]; the derived `Debug` prints them
/// redacted.
#[derive(Debug)]
pub struct Cloudflare {
    target: RecordTarget,
    zone_identifier: String,
    identifier: String,
    auth: Auth,
    proxied: bool,
    ttl: u32,
}

/// Build Cloudflare settings
pub fn construct(
    options: &serde_json::Value,
    domain: &str,
    host: &str,
    ip_version: IpVersion,
) -> Result<Box<dyn Settings>> {
    let provider = ProviderId::Cloudflare;
    let options: Options = decode_options(provider, options)?;
    require(provider, "zone_identifier", &options.zone_identifier)?;
    require(provider, "identifier", &options.identifier)?;
    if options.ttl == 0 {
        return Err(Error::validation(provider, "ttl", "must be greater than zero"));
    }

    let auth = if !options.token.is_empty() {
        Auth::Token(SecretString::from(options.token))
    } else if !options.user_service_key.is_empty() {
        Auth::UserServiceKey(SecretString::from(options.user_service_key))
    } else if !options.email.is_empty() || !options.key.is_empty() {
        require_match(provider, "email", &options.email, EMAIL_PATTERN)?;
        require(provider, "key", &options.key)?;
        Auth::GlobalKey {
            email: options.email,
            key: SecretString::from(options.key),
        }
    } else {
        return Err(Error::validation(
            provider,
            "token",
            "one of token, user_service_key or email and key must be set",
        ));
    };

    Ok(Box::new(Cloudflare {
        target: RecordTarget::new(provider, domain, host, ip_version)?,
        zone_identifier: options.zone_identifier,
        identifier: options.identifier,
        auth,
        proxied: options.proxied,
        ttl: options.ttl,
    }))
}

impl Cloudflare {
    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let provider = ProviderId::Cloudflare;
        let url = common::endpoint_with_path(
            provider,
            CLOUDFLARE_API_BASE,
            &["zones", self.zone_identifier.as_str(), "dns_records", self.identifier.as_str()],
        )?;

        let name = self.build_domain_name();
        let payload = UpdateRequest {
            record_type: record_type(ip),
            name: &name,
            content: ip.to_string(),
            proxied: self.proxied,
            ttl: self.ttl,
        };

        let request = transport.request(Method::PUT, url).json(&payload);
        let request = match &self.auth {
            Auth::Token(token) => request.bearer_auth(token.expose_secret()),
            Auth::UserServiceKey(key) => request.header("X-Auth-User-Service-Key", key.expose_secret()),
            Auth::GlobalKey { email, key } => request
                .header("X-Auth-Email", email.as_str())
                .header("X-Auth-Key", key.expose_secret()),
        };

        let response = transport.execute(provider, cancel, request).await?;
        if let Some(acceptance) = common::screen(provider, RULES, &response)? {
            return Ok(common::outcome(acceptance, ip));
        }

        let body: UpdateResponse = common::decode_json(provider, &response)?;
        if !body.success {
            let errors = body
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::rejected(provider, Rejection::Unsuccessful, errors));
        }

        let result = body
            .result
            .ok_or_else(|| Error::malformed(provider, "success without result"))?;
        let echoed = common::parse_ip(provider, &result.content)?;
        let effective = classify::confirm_ip(provider, Some(echoed), ip, false)?;
        Ok(UpdateOutcome::Updated { ip: effective })
    }
}

#[async_trait]
impl Settings for Cloudflare {
    fn provider(&self) -> ProviderId {
        ProviderId::Cloudflare
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    /// Update the record
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "type": "A" or "AAAA",
    ///   "name": "home.example.com",
    ///   "content": "1.2.3.4",
    ///   "proxied": false,
    ///   "ttl": 1
    /// }
    /// ```
    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
