use lr_core::{domain::is_interstitial, interstitial, InterstitialMatch, ResolutionResult};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect, Client, StatusCode, Url,
};
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;

pub mod batch;
pub mod config;

pub use config::Config;

const TCP_KEEPALIVE_DURATION: Duration = Duration::from_secs(20);

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Invalid header name: {0:?}")]
    InvalidHeaderName(String),
    #[error("Invalid header value: {0:?}")]
    InvalidHeaderValue(String),
    #[error("Resolution cancelled")]
    Cancelled,
}

/// Where a URL ended up, and how we know.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Expansion {
    /// The redirect chain left the platform.
    Direct { landed: Url },
    /// The final page had a non-success status, so it wasn't inspected.
    Status { landed: Url, status: StatusCode },
    /// The redirect chain stopped on an interstitial that named its target.
    Extracted {
        landed: Url,
        found: InterstitialMatch,
    },
    /// The redirect chain stopped on an interstitial we couldn't read.
    Unmatched { landed: Url },
}

impl Expansion {
    pub fn landed(&self) -> &Url {
        match self {
            Self::Direct { landed } => landed,
            Self::Status { landed, .. } => landed,
            Self::Extracted { landed, .. } => landed,
            Self::Unmatched { landed } => landed,
        }
    }

    pub fn expanded(&self) -> &str {
        match self {
            Self::Extracted { found, .. } => &found.url,
            other => other.landed().as_str(),
        }
    }

    pub fn into_result(self, original: String) -> ResolutionResult {
        let expanded = match self {
            Self::Extracted { found, .. } => found.url,
            other => other.landed().to_string(),
        };

        ResolutionResult::new(original, expanded)
    }
}

impl Display for Expansion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct { .. } => write!(f, "direct"),
            Self::Status { status, .. } => write!(f, "status {}", status.as_u16()),
            Self::Extracted { found, .. } => write!(f, "{}", found.strategy),
            Self::Unmatched { .. } => write!(f, "unmatched interstitial"),
        }
    }
}

/// Resolves short links, sharing one connection pool across requests.
#[derive(Clone, Debug)]
pub struct Resolver {
    client: Client,
    config: Config,
}

impl Resolver {
    pub fn new(config: Config) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();

        for (name, value) in &config.extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::InvalidHeaderName(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| Error::InvalidHeaderValue(value.clone()))?;

            headers.insert(name, value);
        }

        let mut builder = Client::builder()
            .tcp_keepalive(Some(TCP_KEEPALIVE_DURATION))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(redirect::Policy::limited(config.max_redirects));

        if !config.system_proxy {
            builder = builder.no_proxy();
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a URL, never failing: errors are logged and reported in the
    /// result.
    pub async fn resolve(&self, url: &str) -> ResolutionResult {
        match self.expand(url).await {
            Ok(expansion) => {
                log::debug!("Expanded {} ({}): {}", url, expansion, expansion.expanded());

                expansion.into_result(url.to_string())
            }
            Err(error) => {
                log::warn!("Error expanding {}: {}", url, error);

                ResolutionResult::failed(url.to_string())
            }
        }
    }

    pub async fn expand(&self, url: &str) -> Result<Expansion, Error> {
        self.expand_with_timeout(url, self.config.timeout).await
    }

    /// Follow the redirects for a URL and, if we end up on an interstitial,
    /// look for the destination in the page.
    ///
    /// The timeout covers the whole operation, including reading the body.
    pub async fn expand_with_timeout(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Expansion, Error> {
        match tokio::time::timeout(timeout, self.expand_once(url, timeout)).await {
            Ok(Err(Error::Client(error))) if error.is_timeout() => Err(Error::Timeout(timeout)),
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(timeout)),
        }
    }

    async fn expand_once(&self, url: &str, timeout: Duration) -> Result<Expansion, Error> {
        let response = self.client.get(url).timeout(timeout).send().await?;
        let landed = response.url().clone();
        let status = response.status();

        if !status.is_success() {
            return Ok(Expansion::Status { landed, status });
        }

        if !is_interstitial(&landed, &self.config.interstitial_hosts) {
            return Ok(Expansion::Direct { landed });
        }

        let content = response.text().await?;

        Ok(match interstitial::extract(&content) {
            Some(found) => Expansion::Extracted { landed, found },
            None => Expansion::Unmatched { landed },
        })
    }
}
