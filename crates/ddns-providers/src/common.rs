//! Helpers shared by the provider modules

use ddns_core::classify::{self, Acceptance, Rejection, Rule, Verdict};
use ddns_core::http::single_line;
use ddns_core::{Error, HttpResponse, ProviderId, Result, Settings, UpdateOutcome};
use serde::de::DeserializeOwned;
use std::net::IpAddr;
use tracing::{info, warn};
use url::Url;

/// Parse a fixed endpoint
pub(crate) fn endpoint(provider: ProviderId, base: &str) -> Result<Url> {
    Url::parse(base).map_err(|e| Error::config(format!("{provider}: invalid endpoint {base}: {e}")))
}

/// Parse a fixed endpoint and append percent-encoded path segments
pub(crate) fn endpoint_with_path(provider: ProviderId, base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = endpoint(provider, base)?;
    url.path_segments_mut()
        .map_err(|()| Error::config(format!("{provider}: endpoint {base} cannot have a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// The address to send, or `auto` to let the provider use the one it sees
pub(crate) fn ip_or_auto(ip: IpAddr, use_provider_ip: bool) -> String {
    if use_provider_ip {
        "auto".to_string()
    } else {
        ip.to_string()
    }
}

pub(crate) fn outcome(acceptance: Acceptance, ip: IpAddr) -> UpdateOutcome {
    match acceptance {
        Acceptance::Updated => UpdateOutcome::Updated { ip },
        Acceptance::Unchanged => UpdateOutcome::Unchanged { ip },
    }
}

/// Build the outcome of a plain text response that may echo the address
pub(crate) fn echoed_outcome(
    provider: ProviderId,
    acceptance: Acceptance,
    response: &HttpResponse,
    sent: IpAddr,
    use_provider_ip: bool,
) -> Result<UpdateOutcome> {
    let ip = classify::confirm_ip(provider, classify::find_ip_like(&response.body, sent), sent, use_provider_ip)?;
    Ok(outcome(acceptance, ip))
}

/// Apply status rules to a structured response
///
/// Returns `None` for a 2xx response no rule matched; the caller then
/// decodes the body.
pub(crate) fn screen(provider: ProviderId, rules: &[Rule], response: &HttpResponse) -> Result<Option<Acceptance>> {
    match classify::classify(rules, response.status, &response.body) {
        Verdict::Unknown => Ok(None),
        verdict => classify::into_acceptance(provider, verdict, response).map(Some),
    }
}

/// Classify a status field of a decoded body
///
/// Values no rule covers are an unsuccessful response.
pub(crate) fn classify_field(provider: ProviderId, rules: &[Rule], value: &str) -> Result<Acceptance> {
    match classify::classify(rules, 200, value) {
        Verdict::Unknown => Err(Error::rejected(
            provider,
            Rejection::Unsuccessful,
            single_line(value).to_lowercase(),
        )),
        verdict => classify::into_acceptance(provider, verdict, &HttpResponse::new(200, value)),
    }
}

/// Decode a JSON body
pub(crate) fn decode_json<T: DeserializeOwned>(provider: ProviderId, response: &HttpResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|e| {
        Error::malformed(provider, format!("{e}: {}", response.single_line()))
    })
}

/// Parse an address returned in a structured body
pub(crate) fn parse_ip(provider: ProviderId, text: &str) -> Result<IpAddr> {
    text.trim()
        .parse()
        .map_err(|_| Error::malformed(provider, format!("invalid IP address {text:?}")))
}

/// Log the result of an update and hand it back
pub(crate) fn logged<S>(settings: &S, result: Result<UpdateOutcome>) -> Result<UpdateOutcome>
where
    S: Settings + ?Sized,
{
    match &result {
        Ok(UpdateOutcome::Updated { ip }) => {
            info!(provider = %settings.provider(), record = %settings.build_domain_name(), %ip, "Record updated");
        }
        Ok(UpdateOutcome::Unchanged { ip }) => {
            info!(provider = %settings.provider(), record = %settings.build_domain_name(), %ip, "Record already up to date");
        }
        Err(e) => {
            warn!(provider = %settings.provider(), record = %settings.build_domain_name(), error = %e, "Update failed");
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddns_core::classify::{Marker, rule};

    #[test]
    fn test_endpoint_with_path_encodes_segments() {
        let url = endpoint_with_path(
            ProviderId::Gandi,
            "https://dns.api.gandi.net/api/v5",
            &["domains", "example.com", "records", "a b", "A"],
        )
        .unwrap();
        assert_eq!(url.path(), "/api/v5/domains/example.com/records/a%20b/A");
    }

    #[test]
    fn test_ip_or_auto() {
        let ip: IpAddr = "1.2.3.4".parse().unwrap();
        assert_eq!(ip_or_auto(ip, false), "1.2.3.4");
        assert_eq!(ip_or_auto(ip, true), "auto");
    }

    #[test]
    fn test_screen_leaves_unmatched_success_to_caller() {
        const RULES: &[Rule] = &[
            rule(Marker::Status(401), Verdict::AuthFailed),
            rule(Marker::NonSuccess, Verdict::BadStatus),
        ];
        let ok = HttpResponse::new(200, "{}");
        assert_eq!(screen(ProviderId::Linode, RULES, &ok).unwrap(), None);

        let denied = HttpResponse::new(401, "denied");
        let err = screen(ProviderId::Linode, RULES, &denied).unwrap_err();
        assert!(matches!(err, Error::Authentication { .. }));
    }

    #[test]
    fn test_classify_field_fallback_is_unsuccessful() {
        const RULES: &[Rule] = &[rule(Marker::Equals("1"), Verdict::Updated)];
        assert_eq!(classify_field(ProviderId::Dnspod, RULES, "1").unwrap(), Acceptance::Updated);
        let err = classify_field(ProviderId::Dnspod, RULES, "-15").unwrap_err();
        assert!(matches!(
            err,
            Error::Rejected {
                rejection: Rejection::Unsuccessful,
                ..
            }
        ));
    }

    #[test]
    fn test_echoed_outcome_checks_address() {
        let sent: IpAddr = "1.2.3.4".parse().unwrap();
        let response = HttpResponse::new(200, "good 5.6.7.8");
        let err = echoed_outcome(ProviderId::Dyn, Acceptance::Updated, &response, sent, false).unwrap_err();
        assert!(matches!(
            err,
            Error::Rejected {
                rejection: Rejection::IpMismatch,
                ..
            }
        ));

        let outcome = echoed_outcome(ProviderId::Dyn, Acceptance::Updated, &response, sent, true).unwrap();
        assert_eq!(outcome.ip(), "5.6.7.8".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_decode_json_reports_malformed() {
        let response = HttpResponse::new(200, "<html>");
        let err = decode_json::<serde_json::Value>(ProviderId::Linode, &response).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }
}
