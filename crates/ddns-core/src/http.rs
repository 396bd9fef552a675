//! HTTP transport shared by all providers
//!
//! The [`Transport`] wraps a caller-owned `reqwest::Client`; providers shape
//! one request, hand it to [`Transport::execute`] and classify the
//! [`HttpResponse`] they get back. The transport never retries.

use crate::error::{Error, Result, TransportFailure};
use crate::types::ProviderId;
use reqwest::{Method, RequestBuilder};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Client signature sent with every request
pub const USER_AGENT: &str = concat!("ddns-updater/", env!("CARGO_PKG_VERSION"));

/// Longest response body excerpt surfaced in errors
const MAX_BODY_CHARS: usize = 256;

/// Handle on the HTTP client used for provider requests
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    /// Replaces scheme, host and port of every request when set
    base_url: Option<Url>,
}

impl Transport {
    /// Wrap an existing client
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    /// Build a client with a request timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::new(client))
    }

    /// Route every request to `base_url`, keeping path and query
    ///
    /// Used to point providers at a local mock server.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Apply the base URL override to `url`
    pub fn route(&self, url: Url) -> Url {
        let Some(base) = &self.base_url else {
            return url;
        };
        let mut routed = base.clone();
        routed.set_path(url.path());
        routed.set_query(url.query());
        routed
    }

    /// Start a request carrying the client signature
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, self.route(url))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
    }

    /// Send `request` and read the whole body
    ///
    /// Returns as soon as `cancel` fires, dropping the in-flight request.
    pub async fn execute(
        &self,
        provider: ProviderId,
        cancel: &CancellationToken,
        request: RequestBuilder,
    ) -> Result<HttpResponse> {
        let request = request
            .build()
            .map_err(|e| Error::transport(provider, TransportFailure::Network, e.without_url().to_string()))?;

        // Only the origin: paths and queries of several providers embed credentials
        debug!(
            provider = %provider,
            method = %request.method(),
            origin = %request.url().origin().ascii_serialization(),
            "Sending update request"
        );

        let round_trip = async {
            let response = self
                .client
                .execute(request)
                .await
                .map_err(|e| request_error(provider, e, TransportFailure::Network))?;
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| request_error(provider, e, TransportFailure::Body))?;
            Ok::<_, Error>(HttpResponse { status, body })
        };

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Error::cancelled(provider)),
            response = round_trip => response?,
        };

        debug!(provider = %provider, status = response.status, "Received provider response");
        Ok(response)
    }
}

fn request_error(provider: ProviderId, err: reqwest::Error, otherwise: TransportFailure) -> Error {
    let kind = if err.is_timeout() {
        TransportFailure::Timeout
    } else {
        otherwise
    };
    Error::transport(provider, kind, err.without_url().to_string())
}

/// Status and full body of a provider response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        crate::classify::is_success(self.status)
    }

    /// Body on one line, truncated for error messages
    pub fn single_line(&self) -> String {
        single_line(&self.body)
    }

    /// Lower-cased [`Self::single_line`]
    pub fn lowercase_line(&self) -> String {
        single_line(&self.body).to_lowercase()
    }
}

/// Collapse line breaks into spaces and truncate
pub fn single_line(text: &str) -> String {
    let line = text
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if line.chars().count() <= MAX_BODY_CHARS {
        line
    } else {
        let truncated: String = line.chars().take(MAX_BODY_CHARS).collect();
        format!("{truncated}...")
    }
}
