//! baocao-vietstock
//!
//! Document source that implements [`DocumentSource`] against the
//! finance.vietstock.vn document listing pages over plain HTTP: `reqwest`
//! transport behind an injectable adapter, `scraper` extraction, and
//! relative links resolved to absolute URLs before they reach the engine.
#![warn(missing_docs)]

/// Adapter definitions and the production adapter backed by `reqwest`.
pub mod adapter;
mod parse;

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;

use adapter::{ListingFetch, RealAdapter};
use baocao_core::{BaocaoError, DocumentSource, ReportDocument};

pub(crate) const SOURCE_NAME: &str = "baocao-vietstock";

const DEFAULT_BASE_URL: &str = "https://finance.vietstock.vn";

/// Public document source. Production users construct it via
/// [`VietstockSource::builder`].
pub struct VietstockSource {
    adapter: Arc<dyn ListingFetch>,
    base: Url,
}

impl VietstockSource {
    /// Stable source name used when tagging errors.
    pub const NAME: &'static str = SOURCE_NAME;

    /// Start building a source against the default vietstock base URL.
    #[must_use]
    pub fn builder() -> VietstockBuilder {
        VietstockBuilder::new()
    }

    /// For tests/injection (requires the `test-adapters` feature).
    #[cfg(feature = "test-adapters")]
    #[must_use]
    pub fn from_adapter(adapter: Arc<dyn ListingFetch>, base: Url) -> Self {
        Self { adapter, base }
    }
}

#[async_trait]
impl DocumentSource for VietstockSource {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "baocao_vietstock::fetch", skip(self)),
    )]
    async fn fetch(
        &self,
        stock_code: &str,
        year: Option<i32>,
    ) -> Result<Vec<ReportDocument>, BaocaoError> {
        let code = stock_code.to_uppercase();
        let html = self.adapter.fetch_listing(&code, year).await?;
        parse::parse_listing(&html, &self.base)
    }
}

/// Builder for constructing a [`VietstockSource`].
pub struct VietstockBuilder {
    base_url: String,
    http: Option<reqwest::Client>,
}

impl Default for VietstockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VietstockBuilder {
    /// Create a builder pointed at the production site.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http: None,
        }
    }

    /// Override the site base URL (tests point this at a local server).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Supply a pre-configured HTTP client (proxies, timeouts, TLS).
    #[must_use]
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the source.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the base URL does not parse.
    pub fn build(self) -> Result<VietstockSource, BaocaoError> {
        let base = Url::parse(&self.base_url).map_err(|e| {
            BaocaoError::invalid_arg(format!("invalid base url '{}': {e}", self.base_url))
        })?;
        let http = self.http.unwrap_or_default();
        Ok(VietstockSource {
            adapter: Arc::new(RealAdapter::new(http, base.clone())),
            base,
        })
    }
}
