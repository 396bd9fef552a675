// # ddns-core
//
// Core library for the DDNS provider update protocol.
//
// ## Architecture Overview
//
// This library defines what every DNS provider integration shares:
// - **Settings**: Trait for one configured record and its single update request
// - **ProviderRegistry**: Explicit registry mapping provider ids to constructors
// - **classify**: Ordered marker tables turning (status, body) into outcomes
// - **Transport**: Caller-owned HTTP client with cancellation and a user agent
// - **Error**: The classified error taxonomy the scheduler decides policy from
//
// ## Design Principles
//
// 1. **Stateless Updates**: Settings are immutable after construction
// 2. **One Request**: Every update performs exactly one HTTP round trip
// 3. **Classification as Data**: Marker rules are tables, tested as data
// 4. **No Internal Retries**: Every error goes back to the caller

pub mod classify;
pub mod config;
pub mod error;
pub mod http;
pub mod registry;
pub mod traits;
pub mod types;

// Re-export core types for convenience
pub use classify::{Acceptance, Marker, Rejection, Rule, Verdict};
pub use config::{ConfigFile, SettingsEntry};
pub use error::{Error, ErrorKind, Result, TransportFailure};
pub use http::{HttpResponse, Transport, USER_AGENT};
pub use registry::ProviderRegistry;
pub use traits::{Settings, SettingsFactory};
pub use types::{
    DisplayRow, IpVersion, Link, ProviderId, RecordTarget, UpdateOutcome, build_domain_name,
    record_type,
};
