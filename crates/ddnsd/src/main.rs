// # ddnsd - one-shot DDNS updater
//
// A thin integration layer: it reads the environment, builds every
// configured record through the provider registry and pushes the observed
// IP to each of them once. Provider logic lives in `ddns-providers`,
// classification and transport in `ddns-core`.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `DDNS_CONFIG_PATH`: Path to a settings file `{"settings": [...]}`
// - `DDNS_SETTINGS`: The same document inline (used when no path is set)
// - `DDNS_IP`: The observed public IP to publish (required)
// - `DDNS_HTTP_TIMEOUT_SECS`: Per-request timeout, 10 to 300 (default 10)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn or error (default info)
//
// ## Example
//
// ```bash
// export DDNS_CONFIG_PATH=/etc/ddns/config.json
// export DDNS_IP=203.0.113.7
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::{ConfigFile, ErrorKind, ProviderRegistry, Settings, Transport};
use std::env;
use std::net::IpAddr;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Every update succeeded
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// At least one update failed
    UpdateFailed = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Where the settings document comes from
enum SettingsSource {
    Path(String),
    Inline(String),
}

/// Application configuration
struct Config {
    source: SettingsSource,
    ip: IpAddr,
    http_timeout: Duration,
    log_level: Level,
}

impl Config {
    /// Load and validate configuration from environment variables
    fn from_env() -> Result<Self> {
        let source = match (env::var("DDNS_CONFIG_PATH"), env::var("DDNS_SETTINGS")) {
            (Ok(path), _) if !path.is_empty() => SettingsSource::Path(path),
            (_, Ok(inline)) if !inline.is_empty() => SettingsSource::Inline(inline),
            _ => anyhow::bail!(
                "DDNS_CONFIG_PATH or DDNS_SETTINGS is required. \
                Set it via: export DDNS_CONFIG_PATH=/etc/ddns/config.json"
            ),
        };

        let ip = env::var("DDNS_IP")
            .context("DDNS_IP is required. Set it via: export DDNS_IP=203.0.113.7")?;
        let ip: IpAddr = ip
            .trim()
            .parse()
            .with_context(|| format!("DDNS_IP '{ip}' is not an IP address"))?;

        let http_timeout = match env::var("DDNS_HTTP_TIMEOUT_SECS") {
            Ok(value) => parse_timeout(&value)?,
            Err(_) => Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        };

        let log_level = parse_log_level(&env::var("DDNS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()))?;

        Ok(Self {
            source,
            ip,
            http_timeout,
            log_level,
        })
    }

    fn load_settings(&self) -> Result<ConfigFile> {
        let file = match &self.source {
            SettingsSource::Path(path) => ConfigFile::load(path)?,
            SettingsSource::Inline(text) => ConfigFile::from_json(text)?,
        };
        Ok(file)
    }
}

fn parse_timeout(value: &str) -> Result<Duration> {
    let secs: u64 = value
        .trim()
        .parse()
        .with_context(|| format!("DDNS_HTTP_TIMEOUT_SECS '{value}' is not a number"))?;
    if !(10..=300).contains(&secs) {
        anyhow::bail!("DDNS_HTTP_TIMEOUT_SECS must be between 10 and 300 seconds. Got: {secs}");
    }
    Ok(Duration::from_secs(secs))
}

fn parse_log_level(value: &str) -> Result<Level> {
    match value.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{value}' is not valid. \
            Valid levels: trace, debug, info, warn, error"
        ),
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(config.log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {e}");
        return DdnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let code = rt.block_on(async {
        match run(config).await {
            Ok(code) => code,
            Err(e) => {
                error!("Startup error: {:#}", e);
                DdnsExitCode::ConfigError
            }
        }
    });

    code.into()
}

/// Build every configured record and update it once
async fn run(config: Config) -> Result<DdnsExitCode> {
    let registry = ddns_providers::default_registry()?;
    let file = config.load_settings()?;
    let settings = build_settings(&registry, &file, config.ip)?;
    if settings.is_empty() {
        anyhow::bail!("no usable settings entry");
    }

    let transport = Transport::with_timeout(config.http_timeout)?;
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling in-flight update");
                cancel.cancel();
            }
        })
    };

    info!(records = settings.len(), ip = %config.ip, "Starting updates");

    let mut failures = 0usize;
    for entry in &settings {
        if cancel.is_cancelled() {
            failures += 1;
            continue;
        }
        if entry.update(&cancel, &transport, config.ip).await.is_err() {
            failures += 1;
        }
    }
    watcher.abort();

    if failures > 0 {
        error!(failed = failures, total = settings.len(), "Some updates failed");
        Ok(DdnsExitCode::UpdateFailed)
    } else {
        info!(total = settings.len(), "All records up to date");
        Ok(DdnsExitCode::Success)
    }
}

/// Build settings for every valid entry that applies to `ip`
///
/// Entries with invalid provider options are logged and skipped so one typo
/// does not block the other records. An unknown provider token or a
/// malformed entry fails the whole configuration.
fn build_settings(registry: &ProviderRegistry, file: &ConfigFile, ip: IpAddr) -> Result<Vec<Box<dyn Settings>>> {
    let mut settings = Vec::with_capacity(file.settings.len());
    for (index, entry) in file.settings.iter().enumerate() {
        let built = match registry.create_from_entry(entry) {
            Ok(built) => built,
            Err(e) if matches!(e.kind(), ErrorKind::UnknownProvider | ErrorKind::Config) => {
                return Err(e).with_context(|| format!("settings entry {index}"));
            }
            Err(e) => {
                warn!(entry = index, provider = %entry.provider, error = %e, "Skipping invalid settings entry");
                continue;
            }
        };
        if !built.ip_version().accepts(ip) {
            info!(
                record = %built.build_domain_name(),
                ip_version = %built.ip_version(),
                "Skipping record, IP version does not apply"
            );
            continue;
        }
        settings.push(built);
    }
    Ok(settings)
}
