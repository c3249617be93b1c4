use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use baocao_core::{
    AnalysisIntent, BaocaoError, ChoiceChannel, DocumentSource, IntentParser, ReportChoice,
    ReportDocument,
};

enum ScriptedFailure {
    Timeout,
    Error(String),
}

/// Scripted document source for CI-safe examples and tests.
///
/// Listings are keyed by `(ticker, year)`; a lookup falls back to the
/// year-agnostic `(ticker, None)` entry, and an unknown ticker behaves like a
/// listing page that never loads.
pub struct MockSource {
    listings: HashMap<(String, Option<i32>), Vec<ReportDocument>>,
    failures: HashMap<String, ScriptedFailure>,
    calls: AtomicUsize,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            listings: HashMap::new(),
            failures: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script the listing returned for `stock_code` under the given year
    /// filter (use `None` for the unfiltered listing).
    #[must_use]
    pub fn with_listing(
        mut self,
        stock_code: &str,
        year: Option<i32>,
        documents: Vec<ReportDocument>,
    ) -> Self {
        self.listings
            .insert((stock_code.to_uppercase(), year), documents);
        self
    }

    /// Make every fetch for `stock_code` fail like an unreachable listing.
    #[must_use]
    pub fn with_timeout(mut self, stock_code: &str) -> Self {
        self.failures
            .insert(stock_code.to_uppercase(), ScriptedFailure::Timeout);
        self
    }

    /// Make every fetch for `stock_code` fail with a generic source error.
    #[must_use]
    pub fn with_failure(mut self, stock_code: &str, msg: &str) -> Self {
        self.failures.insert(
            stock_code.to_uppercase(),
            ScriptedFailure::Error(msg.to_string()),
        );
        self
    }

    /// Number of `fetch` calls observed so far.
    pub fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentSource for MockSource {
    fn name(&self) -> &'static str {
        "baocao-mock"
    }

    async fn fetch(
        &self,
        stock_code: &str,
        year: Option<i32>,
    ) -> Result<Vec<ReportDocument>, BaocaoError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let code = stock_code.to_uppercase();
        if let Some(failure) = self.failures.get(&code) {
            return Err(match failure {
                ScriptedFailure::Timeout => BaocaoError::source_timeout(code),
                ScriptedFailure::Error(msg) => BaocaoError::source("baocao-mock", msg.clone()),
            });
        }
        if let Some(documents) = self.listings.get(&(code.clone(), year)) {
            return Ok(documents.clone());
        }
        if let Some(documents) = self.listings.get(&(code.clone(), None)) {
            return Ok(documents.clone());
        }
        Err(BaocaoError::source_timeout(code))
    }
}

/// Intent parser that always returns the same scripted intent.
pub struct ScriptedParser {
    intent: AnalysisIntent,
}

impl ScriptedParser {
    #[must_use]
    pub fn new(intent: AnalysisIntent) -> Self {
        Self { intent }
    }
}

#[async_trait]
impl IntentParser for ScriptedParser {
    async fn parse(&self, _query: &str) -> Result<AnalysisIntent, BaocaoError> {
        Ok(self.intent.clone())
    }
}

/// Intent parser that always fails, for exercising the fatal-batch path.
pub struct FailingParser {
    msg: String,
}

impl FailingParser {
    #[must_use]
    pub fn new(msg: &str) -> Self {
        Self {
            msg: msg.to_string(),
        }
    }
}

#[async_trait]
impl IntentParser for FailingParser {
    async fn parse(&self, _query: &str) -> Result<AnalysisIntent, BaocaoError> {
        Err(BaocaoError::Parse(self.msg.clone()))
    }
}

/// Choice channel answering from a fixed script of selections.
///
/// Once the script is exhausted, `choose` fails like a broken transport, so a
/// test that expects no clarification can pass an empty script and assert
/// `calls() == 0`.
pub struct ScriptedChannel {
    selections: Mutex<VecDeque<usize>>,
    calls: AtomicUsize,
}

impl ScriptedChannel {
    #[must_use]
    pub fn new(selections: impl IntoIterator<Item = usize>) -> Self {
        Self {
            selections: Mutex::new(selections.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `choose` calls observed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ChoiceChannel for ScriptedChannel {
    async fn choose(
        &self,
        _prompt: &str,
        _choices: &[ReportChoice],
    ) -> Result<usize, BaocaoError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let next = self
            .selections
            .lock()
            .map_or(None, |mut selections| selections.pop_front());
        next.ok_or_else(|| BaocaoError::Channel("selection script exhausted".to_string()))
    }
}

/// Choice channel that never answers, for exercising clarification timeouts.
pub struct StallingChannel;

#[async_trait]
impl ChoiceChannel for StallingChannel {
    async fn choose(
        &self,
        _prompt: &str,
        _choices: &[ReportChoice],
    ) -> Result<usize, BaocaoError> {
        tokio::time::sleep(Duration::from_secs(86_400)).await;
        Err(BaocaoError::Channel("stalled channel woke up".to_string()))
    }
}
