//! Shared value types
//!
//! - [`ProviderId`]: the closed set of supported providers
//! - [`IpVersion`]: which address family a record tracks
//! - [`RecordTarget`]: the (domain, host, ip version) binding of one settings instance
//! - [`DisplayRow`]: read-only description for the status page
//! - [`UpdateOutcome`]: what a successful update reports

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Host marker meaning "the bare domain"
pub const ROOT_HOST: &str = "@";

/// Identifier of a supported DNS provider
///
/// This enumeration is the single source of truth for which providers
/// exist. The string form is the token used in configuration files.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderId {
    Cloudflare,
    Dd24,
    Ddnss,
    Digitalocean,
    Dnsomatic,
    Dnspod,
    Dondominio,
    Dreamhost,
    Duckdns,
    Dyn,
    Dynv6,
    Freedns,
    Gandi,
    Godaddy,
    Google,
    He,
    Infomaniak,
    Linode,
    Luadns,
    Namecheap,
    Njalla,
    Noip,
    Opendns,
    Ovh,
    #[serde(rename = "selfhost.de")]
    #[strum(serialize = "selfhost.de")]
    SelfhostDe,
    Spdyn,
    Strato,
}

impl ProviderId {
    /// Parse a configuration token, failing with [`Error::UnknownProvider`]
    pub fn parse(token: &str) -> Result<Self> {
        token
            .parse()
            .map_err(|_| Error::unknown_provider(token))
    }

    /// All providers, in declaration order
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    /// The canonical configuration token
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Human readable provider name
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Cloudflare => "Cloudflare",
            Self::Dd24 => "DD24",
            Self::Ddnss => "DDNSS.de",
            Self::Digitalocean => "DigitalOcean",
            Self::Dnsomatic => "dnsomatic",
            Self::Dnspod => "DNSPod",
            Self::Dondominio => "DonDominio",
            Self::Dreamhost => "Dreamhost",
            Self::Duckdns => "DuckDNS",
            Self::Dyn => "Dyn DNS",
            Self::Dynv6 => "dynv6",
            Self::Freedns => "FreeDNS",
            Self::Gandi => "gandi",
            Self::Godaddy => "GoDaddy",
            Self::Google => "Google",
            Self::He => "he.net",
            Self::Infomaniak => "Infomaniak",
            Self::Linode => "Linode",
            Self::Luadns => "LuaDNS",
            Self::Namecheap => "Namecheap",
            Self::Njalla => "Njalla",
            Self::Noip => "NoIP",
            Self::Opendns => "OpenDNS",
            Self::Ovh => "OVH DNS",
            Self::SelfhostDe => "selfhost.de",
            Self::Spdyn => "Spdyn DNS",
            Self::Strato => "Strato DNS",
        }
    }

    /// Provider homepage, linked from the status page
    pub fn homepage(self) -> &'static str {
        match self {
            Self::Cloudflare => "https://www.cloudflare.com",
            Self::Dd24 => "https://www.domaindiscount24.com/",
            Self::Ddnss => "https://ddnss.de/",
            Self::Digitalocean => "https://www.digitalocean.com/",
            Self::Dnsomatic => "https://www.dnsomatic.com/",
            Self::Dnspod => "https://www.dnspod.cn/",
            Self::Dondominio => "https://www.dondominio.com/",
            Self::Dreamhost => "https://www.dreamhost.com/",
            Self::Duckdns => "https://www.duckdns.org/",
            Self::Dyn => "https://dyn.com/",
            Self::Dynv6 => "https://dynv6.com/",
            Self::Freedns => "https://freedns.afraid.org/",
            Self::Gandi => "https://www.gandi.net/",
            Self::Godaddy => "https://godaddy.com",
            Self::Google => "https://domains.google.com",
            Self::He => "https://dns.he.net/",
            Self::Infomaniak => "https://www.infomaniak.com/",
            Self::Linode => "https://cloud.linode.com/",
            Self::Luadns => "https://www.luadns.com/",
            Self::Namecheap => "https://www.namecheap.com",
            Self::Njalla => "https://njal.la/",
            Self::Noip => "https://www.noip.com/",
            Self::Opendns => "https://opendns.com/",
            Self::Ovh => "https://www.ovh.com/",
            Self::SelfhostDe => "https://www.selfhost.de/",
            Self::Spdyn => "https://spdyn.de/",
            Self::Strato => "https://strato.com/",
        }
    }
}

/// IP version a record applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpVersion {
    /// IPv4 only
    #[serde(rename = "ipv4")]
    Ipv4,
    /// IPv6 only
    #[serde(rename = "ipv6")]
    Ipv6,
    /// Whichever family the observed address has
    #[default]
    #[serde(rename = "ipv4 or ipv6")]
    Ipv4OrIpv6,
}

impl IpVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Ipv4OrIpv6 => "ipv4 or ipv6",
        }
    }

    /// Whether `ip` belongs to a family this version covers
    pub fn accepts(self, ip: IpAddr) -> bool {
        match self {
            Self::Ipv4 => ip.is_ipv4(),
            Self::Ipv6 => ip.is_ipv6(),
            Self::Ipv4OrIpv6 => true,
        }
    }
}

impl std::fmt::Display for IpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IpVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ipv4" => Ok(Self::Ipv4),
            "ipv6" => Ok(Self::Ipv6),
            "" | "ipv4 or ipv6" => Ok(Self::Ipv4OrIpv6),
            other => Err(Error::config(format!("invalid IP version: {other}"))),
        }
    }
}

/// DNS record type matching the address family of `ip`
pub fn record_type(ip: IpAddr) -> &'static str {
    match ip {
        IpAddr::V4(_) => "A",
        IpAddr::V6(_) => "AAAA",
    }
}

/// Build the fully qualified hostname for `host` under `domain`
///
/// [`ROOT_HOST`] designates the domain itself. Every provider derives its
/// hostname through this function.
pub fn build_domain_name(host: &str, domain: &str) -> String {
    if host == ROOT_HOST {
        domain.to_string()
    } else {
        format!("{host}.{domain}")
    }
}

/// The record one settings instance keeps up to date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTarget {
    domain: String,
    host: String,
    ip_version: IpVersion,
}

impl RecordTarget {
    /// Create a record target
    ///
    /// Fails if the domain or host is empty.
    pub fn new(
        provider: ProviderId,
        domain: impl Into<String>,
        host: impl Into<String>,
        ip_version: IpVersion,
    ) -> Result<Self> {
        let domain = domain.into();
        let host = host.into();
        if domain.trim().is_empty() {
            return Err(Error::validation(provider, "domain", "cannot be empty"));
        }
        if host.trim().is_empty() {
            return Err(Error::validation(provider, "host", "cannot be empty"));
        }
        Ok(Self {
            domain,
            host,
            ip_version,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ip_version(&self) -> IpVersion {
        self.ip_version
    }

    /// Whether the host designates the bare domain
    pub fn is_root(&self) -> bool {
        self.host == ROOT_HOST
    }

    /// Fully qualified hostname of the record
    pub fn fqdn(&self) -> String {
        build_domain_name(&self.host, &self.domain)
    }
}

/// A hyperlink in the display record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// Read-only description of a settings instance for the status page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub domain: Link,
    pub host: String,
    pub provider: Link,
    pub ip_version: IpVersion,
}

impl DisplayRow {
    /// Describe `target` as handled by `provider`
    pub fn new(provider: ProviderId, target: &RecordTarget) -> Self {
        let fqdn = target.fqdn();
        Self {
            domain: Link {
                href: format!("http://{fqdn}"),
                text: fqdn,
            },
            host: target.host().to_string(),
            provider: Link {
                text: provider.display_name().to_string(),
                href: provider.homepage().to_string(),
            },
            ip_version: target.ip_version(),
        }
    }
}

/// Result of a successful update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The provider accepted the new address
    Updated {
        /// The address now on record
        ip: IpAddr,
    },
    /// The record already held this address
    Unchanged {
        /// The address on record
        ip: IpAddr,
    },
}

impl UpdateOutcome {
    /// The effective IP, whichever way the provider confirmed it
    pub fn ip(&self) -> IpAddr {
        match self {
            Self::Updated { ip } | Self::Unchanged { ip } => *ip,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_domain_name() {
        assert_eq!(build_domain_name("sub", "example.com"), "sub.example.com");
        assert_eq!(build_domain_name("@", "example.com"), "example.com");
        assert_eq!(build_domain_name("*", "example.com"), "*.example.com");
    }

    #[test]
    fn test_provider_tokens_round_trip() {
        for provider in ProviderId::all() {
            assert_eq!(ProviderId::parse(provider.as_str()).unwrap(), provider);
            assert_eq!(provider.to_string(), provider.as_str());
        }
        assert_eq!(ProviderId::SelfhostDe.as_str(), "selfhost.de");
        assert_eq!(ProviderId::Dd24.as_str(), "dd24");
        assert_eq!(ProviderId::all().count(), 27);
    }

    #[test]
    fn test_unknown_provider_token() {
        let err = ProviderId::parse("route53").unwrap_err();
        assert!(matches!(err, Error::UnknownProvider(ref token) if token == "route53"));
    }

    #[test]
    fn test_ip_version_serde_strings() {
        let version: IpVersion = serde_json::from_str("\"ipv4 or ipv6\"").unwrap();
        assert_eq!(version, IpVersion::Ipv4OrIpv6);
        assert_eq!(serde_json::to_string(&IpVersion::Ipv6).unwrap(), "\"ipv6\"");
        assert_eq!("IPv4".parse::<IpVersion>().unwrap(), IpVersion::Ipv4);
    }

    #[test]
    fn test_ip_version_accepts() {
        let v4: IpAddr = "1.2.3.4".parse().unwrap();
        let v6: IpAddr = "::1".parse().unwrap();
        assert!(IpVersion::Ipv4.accepts(v4));
        assert!(!IpVersion::Ipv4.accepts(v6));
        assert!(IpVersion::Ipv6.accepts(v6));
        assert!(IpVersion::Ipv4OrIpv6.accepts(v4));
    }

    #[test]
    fn test_record_target_rejects_empty_domain() {
        let err = RecordTarget::new(ProviderId::Dd24, "", "@", IpVersion::Ipv4).unwrap_err();
        assert!(matches!(err, Error::Validation { field: "domain", .. }));
    }

    #[test]
    fn test_display_row() {
        let target = RecordTarget::new(ProviderId::Dd24, "example.com", "home", IpVersion::Ipv4).unwrap();
        let row = DisplayRow::new(ProviderId::Dd24, &target);
        assert_eq!(row.domain.text, "home.example.com");
        assert_eq!(row.domain.href, "http://home.example.com");
        assert_eq!(row.provider.text, "DD24");
        assert_eq!(row.host, "home");
    }
}
