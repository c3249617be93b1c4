use async_trait::async_trait;

use crate::BaocaoError;
use crate::types::{AnalysisIntent, ReportChoice, ReportDocument};

/// Listing provider: everything the engine knows about document discovery.
///
/// Implementations return the raw `(title, link)` pairs listed for a ticker,
/// newest first, with links already resolved to absolute URLs. The engine
/// never retries a failed fetch; the request fails and the batch moves on.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Stable identifier used when tagging source errors.
    fn name(&self) -> &'static str;

    /// Fetch all documents listed for `stock_code`, optionally restricted to
    /// one fiscal year.
    ///
    /// # Errors
    /// `SourceTimeout` when the ticker cannot be found or the listing page is
    /// unreachable in time; `Source` for any other fetch failure.
    async fn fetch(
        &self,
        stock_code: &str,
        year: Option<i32>,
    ) -> Result<Vec<ReportDocument>, BaocaoError>;
}

/// Turns a free-form query into an ordered request list plus an objective.
///
/// A parser failure is fatal for the whole batch: nothing is queued and no
/// partial results are produced. An empty request list is tolerated and ends
/// the batch immediately.
#[async_trait]
pub trait IntentParser: Send + Sync {
    /// Parse `query` into an [`AnalysisIntent`].
    ///
    /// # Errors
    /// `Parse` when the query cannot be turned into requests.
    async fn parse(&self, query: &str) -> Result<AnalysisIntent, BaocaoError>;
}

/// Presents a clarification prompt and returns a 1-based selection.
///
/// The transport is irrelevant to the engine: terminal input, a chat turn, or
/// a service callback all fit. A channel may locally re-prompt on malformed
/// input without engine involvement; the engine re-issues the prompt itself
/// when a returned selection is out of range.
#[async_trait]
pub trait ChoiceChannel: Send + Sync {
    /// Ask the external actor to pick one of `choices`.
    ///
    /// # Errors
    /// `Channel` when the transport fails to deliver a selection.
    async fn choose(
        &self,
        prompt: &str,
        choices: &[ReportChoice],
    ) -> Result<usize, BaocaoError>;
}
