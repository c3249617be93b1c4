use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use baocao_core::BaocaoError;

use crate::SOURCE_NAME;

/// Listing transport abstraction (so we can inject mocks in tests).
///
/// Returns the raw HTML of the document listing page for a ticker, with the
/// year filter already applied by the remote side.
#[async_trait]
pub trait ListingFetch: Send + Sync {
    /// Fetch the listing page HTML for `stock_code`, optionally filtered to
    /// one fiscal year.
    async fn fetch_listing(
        &self,
        stock_code: &str,
        year: Option<i32>,
    ) -> Result<String, BaocaoError>;
}

/// Production adapter backed by `reqwest`.
pub struct RealAdapter {
    http: reqwest::Client,
    base: Url,
}

impl RealAdapter {
    /// Build from an HTTP client and the site base URL.
    #[must_use]
    pub const fn new(http: reqwest::Client, base: Url) -> Self {
        Self { http, base }
    }

    fn listing_url(&self, stock_code: &str, year: Option<i32>) -> Result<Url, BaocaoError> {
        let mut url = self
            .base
            .join(&format!("{stock_code}/tai-tai-lieu.htm"))
            .map_err(|e| BaocaoError::source(SOURCE_NAME, format!("bad listing url: {e}")))?;
        url.query_pairs_mut().append_pair("doctype", "1");
        if let Some(year) = year {
            url.query_pairs_mut().append_pair("year", &year.to_string());
        }
        Ok(url)
    }
}

#[async_trait]
impl ListingFetch for RealAdapter {
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "baocao_vietstock::fetch_listing", skip(self)),
    )]
    async fn fetch_listing(
        &self,
        stock_code: &str,
        year: Option<i32>,
    ) -> Result<String, BaocaoError> {
        let url = self.listing_url(stock_code, year)?;
        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                BaocaoError::source_timeout(stock_code)
            } else {
                BaocaoError::source(SOURCE_NAME, e.to_string())
            }
        })?;

        // The site answers an unknown ticker with a 404 on the listing page.
        if response.status() == StatusCode::NOT_FOUND {
            return Err(BaocaoError::source_timeout(stock_code));
        }
        let response = response
            .error_for_status()
            .map_err(|e| BaocaoError::source(SOURCE_NAME, e.to_string()))?;
        response
            .text()
            .await
            .map_err(|e| BaocaoError::source(SOURCE_NAME, e.to_string()))
    }
}
