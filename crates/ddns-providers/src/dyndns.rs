//! The dyndns2 update protocol
//!
//! Many providers clone the original DynDNS API:
//!
//! ```http
//! GET /nic/update?hostname=home.example.com&myip=1.2.3.4
//! Authorization: Basic <username:password>
//! ```
//!
//! answered by a plain text keyword such as `good 1.2.3.4`, `nochg 1.2.3.4`
//! or `badauth`. The keywords each provider actually returns, and the order
//! they must be checked in, differ, so every provider module supplies its
//! own [`Profile`] with its own rule table.

use crate::common;
use async_trait::async_trait;
use ddns_core::classify::{self, Marker, Rejection, Rule, Verdict, rule};
use ddns_core::{ProviderId, RecordTarget, Result, Settings, Transport, UpdateOutcome};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use std::net::IpAddr;
use tokio_util::sync::CancellationToken;

/// Endpoint and response conventions of one dyndns2 provider
#[derive(Debug)]
pub struct Profile {
    /// Absolute update URL, including the path
    pub update_url: &'static str,
    /// Fixed query parameters sent with every update
    pub extra_query: &'static [(&'static str, &'static str)],
    /// Also send the password as a `password` query parameter
    pub password_in_query: bool,
    pub rules: &'static [Rule],
}

/// Rule for a leading keyword
pub(crate) const fn keyword(word: &'static str, verdict: Verdict) -> Rule {
    rule(Marker::StartsWith(word), verdict)
}

pub(crate) const GOOD: Rule = keyword("good", Verdict::Updated);
pub(crate) const NOCHG: Rule = keyword("nochg", Verdict::Unchanged);
pub(crate) const BADAUTH: Rule = keyword("badauth", Verdict::AuthFailed);
pub(crate) const NOHOST: Rule = keyword("nohost", Verdict::Rejected(Rejection::HostnameNotFound));
pub(crate) const NOTFQDN: Rule = keyword("notfqdn", Verdict::Rejected(Rejection::MalformedHostname));
pub(crate) const BADAGENT: Rule = keyword("badagent", Verdict::Rejected(Rejection::BannedUserAgent));
pub(crate) const ABUSE: Rule = keyword("abuse", Verdict::RateLimited);
pub(crate) const DNSERR: Rule = keyword("dnserr", Verdict::Rejected(Rejection::ServerSide));
pub(crate) const SERVER_ERROR: Rule = keyword("911", Verdict::Rejected(Rejection::ServerSide));
pub(crate) const NUMHOST: Rule = keyword("numhost", Verdict::Rejected(Rejection::TooManyHosts));
pub(crate) const BADREQUEST: Rule = keyword("badrequest", Verdict::Rejected(Rejection::BadRequest));

/// Settings of a dyndns2 provider
///
/// Built by the provider modules, which decode and validate their own
/// options first.
#[derive(Debug)]
pub struct DynDns2 {
    provider: ProviderId,
    profile: &'static Profile,
    target: RecordTarget,
    username: String,
    password: SecretString,
    use_provider_ip: bool,
}

impl DynDns2 {
    pub(crate) fn new(
        provider: ProviderId,
        profile: &'static Profile,
        target: RecordTarget,
        username: String,
        password: SecretString,
        use_provider_ip: bool,
    ) -> Self {
        Self {
            provider,
            profile,
            target,
            username,
            password,
            use_provider_ip,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn use_provider_ip(&self) -> bool {
        self.use_provider_ip
    }

    async fn send(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        let mut url = common::endpoint(self.provider, self.profile.update_url)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("hostname", &self.build_domain_name());
            if !self.use_provider_ip {
                query.append_pair("myip", &ip.to_string());
            }
            if self.profile.password_in_query {
                query.append_pair("password", self.password.expose_secret());
            }
            for (key, value) in self.profile.extra_query {
                query.append_pair(key, value);
            }
        }

        let request = transport
            .request(Method::GET, url)
            .basic_auth(&self.username, Some(self.password.expose_secret()));
        let response = transport.execute(self.provider, cancel, request).await?;
        let acceptance = classify::evaluate(self.provider, self.profile.rules, &response)?;
        common::echoed_outcome(self.provider, acceptance, &response, ip, self.use_provider_ip)
    }
}

#[async_trait]
impl Settings for DynDns2 {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    fn target(&self) -> &RecordTarget {
        &self.target
    }

    async fn update(&self, cancel: &CancellationToken, transport: &Transport, ip: IpAddr) -> Result<UpdateOutcome> {
        common::logged(self, self.send(cancel, transport, ip).await)
    }
}
