//! Fetching remote text.
//!
//! Loaders never talk to `reqwest` directly. They take anything implementing
//! [`Fetch`], which the binary satisfies with [`HttpFetcher`] and tests satisfy
//! with in-memory stubs. Every request bypasses HTTP caches: staff edit the
//! spreadsheets and expect the next page visit to see the change.

use std::future::Future;

use reqwest::Url;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use thiserror::Error;

use crate::assets::is_absolute_url;

/// Why a fetch failed. Every variant names the URL that was attempted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

/// A source of text documents addressed by URL.
pub trait Fetch {
    /// Fetch the body at `url` as text. Non-success statuses are errors.
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String, FetchError>>;
}

impl<T: Fetch> Fetch for &T {
    fn fetch_text(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> {
        (**self).fetch_text(url)
    }
}

/// [`Fetch`] over HTTP(S).
///
/// Site-relative URLs (`/class-schedule/index.csv`) are resolved against the
/// configured origin; without one they fail with [`FetchError::InvalidUrl`].
pub struct HttpFetcher {
    http: reqwest::Client,
    origin: Option<Url>,
}

impl HttpFetcher {
    pub fn new(origin: Option<&str>) -> Result<Self, FetchError> {
        let origin = origin
            .map(|o| {
                Url::parse(o).map_err(|e| FetchError::InvalidUrl {
                    url: o.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport {
                url: String::new(),
                message: e.to_string(),
            })?;
        Ok(Self { http, origin })
    }

    /// Turn `url` into an absolute URL.
    pub fn resolve_url(&self, url: &str) -> Result<Url, FetchError> {
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: url.to_string(),
            reason,
        };
        if is_absolute_url(url) {
            return Url::parse(url).map_err(|e| invalid(e.to_string()));
        }
        match &self.origin {
            Some(origin) => origin.join(url).map_err(|e| invalid(e.to_string())),
            None => Err(invalid(
                "relative URL and no origin configured".to_string(),
            )),
        }
    }
}

impl Fetch for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let target = self.resolve_url(url)?;
        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        log::debug!("GET {target}");
        let resp = self
            .http
            .get(target)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(transport)
    }
}
