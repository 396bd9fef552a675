//! Response classification
//!
//! Providers signal the result of an update in wildly different ways: a
//! keyword in a plain text body, a status code, an empty body. Each provider
//! describes its convention as an ordered table of [`Rule`]s and
//! [`evaluate`] turns a response into an [`Acceptance`] or an [`Error`].
//!
//! The first matching rule wins, so failure markers that share a substring
//! with a success marker must come first. When nothing matches, a non-2xx
//! status is a [`Error::BadHttpStatus`] and a 2xx status is an
//! [`Error::UnknownResponse`]: an unrecognized body is never a success.

use crate::error::{Error, Result};
use crate::http::HttpResponse;
use crate::types::ProviderId;
use std::net::IpAddr;

/// A condition on the status code or the response body
///
/// Text markers compare against the lower-cased, trimmed body; [`Marker::Empty`]
/// looks at the body exactly as received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Status equals this code
    Status(u16),
    /// Status differs from this code
    StatusNot(u16),
    /// Status outside 200..=299
    NonSuccess,
    /// Body is empty as received, whitespace included
    Empty,
    Equals(&'static str),
    StartsWith(&'static str),
    Contains(&'static str),
}

impl Marker {
    /// Whether the marker matches
    ///
    /// `raw` is the body as received, `normalized` the same body lower-cased
    /// and trimmed.
    pub fn matches(self, status: u16, raw: &str, normalized: &str) -> bool {
        let body = normalized;
        match self {
            Self::Status(code) => status == code,
            Self::StatusNot(code) => status != code,
            Self::NonSuccess => !is_success(status),
            Self::Empty => raw.is_empty(),
            Self::Equals(text) => body == text,
            Self::StartsWith(text) => body.starts_with(text),
            Self::Contains(text) => body.contains(text),
        }
    }
}

/// A provider refusal that is neither an auth failure nor throttling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The hostname does not exist at the provider ("nohost")
    HostnameNotFound,
    /// The hostname is not a valid FQDN ("notfqdn")
    MalformedHostname,
    /// The provider rejected the request parameters
    BadRequest,
    /// The client signature is blocked ("badagent")
    BannedUserAgent,
    /// The provider had an internal failure ("911", "dnserr")
    ServerSide,
    /// The record conflicts with another record
    Conflict,
    /// The account lacks the feature ("!donator")
    FeatureUnavailable,
    /// The hostname belongs to another account ("!yours")
    NotOwned,
    /// Too many hosts in one request ("numhost")
    TooManyHosts,
    /// The provider echoed a different address than the one sent
    IpMismatch,
    /// A structured response reported failure
    Unsuccessful,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::HostnameNotFound => "hostname does not exist",
            Self::MalformedHostname => "malformed hostname",
            Self::BadRequest => "bad request",
            Self::BannedUserAgent => "user agent is banned",
            Self::ServerSide => "provider server side error",
            Self::Conflict => "conflicting record",
            Self::FeatureUnavailable => "feature unavailable",
            Self::NotOwned => "hostname not owned by account",
            Self::TooManyHosts => "too many hosts",
            Self::IpMismatch => "received IP differs from sent IP",
            Self::Unsuccessful => "unsuccessful response",
        };
        f.write_str(text)
    }
}

/// What a matching rule concludes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Updated,
    Unchanged,
    AuthFailed,
    RateLimited,
    Rejected(Rejection),
    BadStatus,
    /// No rule matched and the status is 2xx
    Unknown,
}

/// One entry of a provider's classification table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub marker: Marker,
    pub verdict: Verdict,
}

/// Shorthand for table literals
pub const fn rule(marker: Marker, verdict: Verdict) -> Rule {
    Rule { marker, verdict }
}

/// Positive result of a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    Updated,
    Unchanged,
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Classify (status, body) against `rules`
///
/// `body` is normalized here; callers pass the raw text.
pub fn classify(rules: &[Rule], status: u16, body: &str) -> Verdict {
    let normalized = body.trim().to_lowercase();
    rules
        .iter()
        .find(|rule| rule.marker.matches(status, body, &normalized))
        .map_or_else(
            || {
                if is_success(status) {
                    Verdict::Unknown
                } else {
                    Verdict::BadStatus
                }
            },
            |rule| rule.verdict,
        )
}

/// Classify a response and map failures to errors
pub fn evaluate(provider: ProviderId, rules: &[Rule], response: &HttpResponse) -> Result<Acceptance> {
    let verdict = classify(rules, response.status, &response.body);
    into_acceptance(provider, verdict, response)
}

/// Map a verdict to an [`Acceptance`] or the matching [`Error`]
pub fn into_acceptance(provider: ProviderId, verdict: Verdict, response: &HttpResponse) -> Result<Acceptance> {
    let body = response.lowercase_line();
    match verdict {
        Verdict::Updated => Ok(Acceptance::Updated),
        Verdict::Unchanged => Ok(Acceptance::Unchanged),
        Verdict::AuthFailed => Err(Error::Authentication { provider, body }),
        Verdict::RateLimited => Err(Error::RateLimited { provider, body }),
        Verdict::Rejected(rejection) => Err(Error::rejected(provider, rejection, body)),
        Verdict::BadStatus => Err(Error::BadHttpStatus {
            provider,
            status: response.status,
            body: response.single_line(),
        }),
        Verdict::Unknown => Err(Error::UnknownResponse { provider, body }),
    }
}

/// IP address literals in `text`, in order
///
/// Tokens are separated by whitespace and markup punctuation and must parse
/// whole, so words such as `a::before` are not mistaken for addresses.
fn ip_literals(text: &str) -> impl Iterator<Item = IpAddr> + '_ {
    text.split(|c: char| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | ',' | ';' | '=' | '(' | ')'))
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            token
                .parse::<IpAddr>()
                .ok()
                .or_else(|| token.strip_suffix('.')?.parse::<IpAddr>().ok())
        })
}

/// First IP address literal found in `text`
pub fn find_ip(text: &str) -> Option<IpAddr> {
    ip_literals(text).next()
}

/// First IP address literal in `text` of the same family as `sent`
///
/// Bodies that echo both the IPv4 and the IPv6 record are checked against
/// the one that was updated.
pub fn find_ip_like(text: &str, sent: IpAddr) -> Option<IpAddr> {
    ip_literals(text).find(|ip| ip.is_ipv4() == sent.is_ipv4())
}

/// Decide the effective IP after an accepted update
///
/// With `use_provider_ip` the provider picked the address itself, so the
/// echoed one wins. Otherwise an echoed address must equal the one sent.
pub fn confirm_ip(
    provider: ProviderId,
    echoed: Option<IpAddr>,
    sent: IpAddr,
    use_provider_ip: bool,
) -> Result<IpAddr> {
    match echoed {
        Some(ip) if use_provider_ip => Ok(ip),
        Some(ip) if ip != sent => Err(Error::rejected(
            provider,
            Rejection::IpMismatch,
            format!("sent {sent} but received {ip}"),
        )),
        _ => Ok(sent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[Rule] = &[
        rule(Marker::StatusNot(200), Verdict::BadStatus),
        rule(Marker::Equals("badauth"), Verdict::AuthFailed),
        rule(Marker::StartsWith("nochg"), Verdict::Unchanged),
        rule(Marker::StartsWith("good"), Verdict::Updated),
    ];

    #[test]
    fn test_first_match_wins() {
        assert_eq!(classify(TABLE, 500, "badauth"), Verdict::BadStatus);
        assert_eq!(classify(TABLE, 200, "BADAUTH\n"), Verdict::AuthFailed);
    }

    #[test]
    fn test_unmatched_success_is_unknown() {
        assert_eq!(classify(TABLE, 200, "something new"), Verdict::Unknown);
        assert_eq!(classify(&[], 200, ""), Verdict::Unknown);
        assert_eq!(classify(&[], 404, ""), Verdict::BadStatus);
    }

    #[test]
    fn test_evaluate_maps_to_errors() {
        let response = HttpResponse::new(200, "Good 1.2.3.4");
        assert_eq!(evaluate(ProviderId::Dyn, TABLE, &response).unwrap(), Acceptance::Updated);

        let response = HttpResponse::new(200, "BadAuth");
        let err = evaluate(ProviderId::Dyn, TABLE, &response).unwrap_err();
        assert!(matches!(err, Error::Authentication { ref body, .. } if body == "badauth"));

        let response = HttpResponse::new(503, "Service\nUnavailable");
        let err = evaluate(ProviderId::Dyn, TABLE, &response).unwrap_err();
        assert!(matches!(err, Error::BadHttpStatus { status: 503, ref body, .. } if body == "Service Unavailable"));
    }

    #[test]
    fn test_find_ip() {
        assert_eq!(find_ip("good 1.2.3.4"), Some("1.2.3.4".parse().unwrap()));
        assert_eq!(find_ip("nochg 2001:db8::1\n"), Some("2001:db8::1".parse().unwrap()));
        assert_eq!(find_ip("<IP>10.0.0.1</IP>"), Some("10.0.0.1".parse().unwrap()));
        assert_eq!(find_ip("Updated 1 hostname."), None);
        assert_eq!(find_ip("good"), None);
    }

    #[test]
    fn test_find_ip_ignores_hex_words() {
        assert_eq!(find_ip("<style>a::before { content: '' }</style>"), None);
        assert_eq!(find_ip("cafe::beef-ish deadbeef"), None);
        assert_eq!(find_ip("host updated to 1.2.3.4."), Some("1.2.3.4".parse().unwrap()));
    }

    #[test]
    fn test_find_ip_like_matches_family() {
        let body = "OK\n1.2.3.4\n2001:db8::1\nUPDATED";
        let v6: IpAddr = "2001:db8::1".parse().unwrap();
        let v4: IpAddr = "1.2.3.4".parse().unwrap();
        assert_eq!(find_ip_like(body, v6), Some(v6));
        assert_eq!(find_ip_like(body, v4), Some(v4));
        assert_eq!(find_ip_like("OK\n1.2.3.4\n\nUPDATED", v6), None);
    }

    #[test]
    fn test_empty_marker_uses_raw_body() {
        const EMPTY_ONLY: &[Rule] = &[rule(Marker::Empty, Verdict::Updated)];
        assert_eq!(classify(EMPTY_ONLY, 200, ""), Verdict::Updated);
        assert_eq!(classify(EMPTY_ONLY, 200, " \n"), Verdict::Unknown);
    }

    #[test]
    fn test_confirm_ip() {
        let sent: IpAddr = "1.2.3.4".parse().unwrap();
        let other: IpAddr = "5.6.7.8".parse().unwrap();
        assert_eq!(confirm_ip(ProviderId::Dyn, None, sent, false).unwrap(), sent);
        assert_eq!(confirm_ip(ProviderId::Dyn, Some(sent), sent, false).unwrap(), sent);
        assert_eq!(confirm_ip(ProviderId::Dyn, Some(other), sent, true).unwrap(), other);
        let err = confirm_ip(ProviderId::Dyn, Some(other), sent, false).unwrap_err();
        assert!(matches!(
            err,
            Error::Rejected {
                rejection: Rejection::IpMismatch,
                ..
            }
        ));
    }
}
