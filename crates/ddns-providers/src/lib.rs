// # DDNS Providers
//
// One module per DNS provider. Each module exposes a `construct` function
// that decodes the provider's options, validates them and returns boxed
// [`Settings`]. Protocol families shared by several providers live in their
// own modules ([`dyndns`]).
//
// ## Usage
//
// ```rust,ignore
// let registry = ddns_providers::default_registry()?;
// let settings = registry.create("duckdns", &options, "example.com", "home", IpVersion::Ipv4)?;
// ```

mod common;
pub mod dyndns;

pub mod cloudflare;
pub mod dd24;
pub mod ddnss;
pub mod digitalocean;
pub mod dnsomatic;
pub mod dnspod;
pub mod dondominio;
pub mod dreamhost;
pub mod duckdns;
pub mod dyn_dns;
pub mod dynv6;
pub mod freedns;
pub mod gandi;
pub mod godaddy;
pub mod google;
pub mod he;
pub mod infomaniak;
pub mod linode;
pub mod luadns;
pub mod namecheap;
pub mod njalla;
pub mod noip;
pub mod opendns;
pub mod ovh;
pub mod selfhost_de;
pub mod spdyn;
pub mod strato;

use ddns_core::{IpVersion, ProviderId, ProviderRegistry, Result, Settings};

/// Signature shared by every provider's `construct`
pub type Constructor = fn(&serde_json::Value, &str, &str, IpVersion) -> Result<Box<dyn Settings>>;

/// The constructor of `provider`
///
/// The match is exhaustive, so adding a [`ProviderId`] without a module
/// does not compile.
pub fn constructor(provider: ProviderId) -> Constructor {
    match provider {
        ProviderId::Cloudflare => cloudflare::construct,
        ProviderId::Dd24 => dd24::construct,
        ProviderId::Ddnss => ddnss::construct,
        ProviderId::Digitalocean => digitalocean::construct,
        ProviderId::Dnsomatic => dnsomatic::construct,
        ProviderId::Dnspod => dnspod::construct,
        ProviderId::Dondominio => dondominio::construct,
        ProviderId::Dreamhost => dreamhost::construct,
        ProviderId::Duckdns => duckdns::construct,
        ProviderId::Dyn => dyn_dns::construct,
        ProviderId::Dynv6 => dynv6::construct,
        ProviderId::Freedns => freedns::construct,
        ProviderId::Gandi => gandi::construct,
        ProviderId::Godaddy => godaddy::construct,
        ProviderId::Google => google::construct,
        ProviderId::He => he::construct,
        ProviderId::Infomaniak => infomaniak::construct,
        ProviderId::Linode => linode::construct,
        ProviderId::Luadns => luadns::construct,
        ProviderId::Namecheap => namecheap::construct,
        ProviderId::Njalla => njalla::construct,
        ProviderId::Noip => noip::construct,
        ProviderId::Opendns => opendns::construct,
        ProviderId::Ovh => ovh::construct,
        ProviderId::SelfhostDe => selfhost_de::construct,
        ProviderId::Spdyn => spdyn::construct,
        ProviderId::Strato => strato::construct,
    }
}

/// Register every built-in provider
///
/// # Errors
///
/// [`ddns_core::Error::DuplicateProvider`] if `registry` already holds one
/// of them.
pub fn register_all(registry: &mut ProviderRegistry) -> Result<()> {
    for provider in ProviderId::all() {
        registry.register(provider, constructor(provider))?;
    }
    Ok(())
}

/// A registry holding every built-in provider
pub fn default_registry() -> Result<ProviderRegistry> {
    let mut registry = ProviderRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}
