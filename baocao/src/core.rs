use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};

use baocao_core::{
    AnalysisIntent, BaocaoConfig, BaocaoError, BatchReport, ChoiceChannel, DocumentSource,
    IntentParser,
};

use crate::engine::batch::{BatchRun, Step};
use crate::engine::prune;

/// Orchestrator that drives batches of report requests against a document
/// source, asking a choice channel whenever the policy cannot decide alone.
pub struct Baocao {
    source: Arc<dyn DocumentSource>,
    parser: Option<Arc<dyn IntentParser>>,
    channel: Option<Arc<dyn ChoiceChannel>>,
    cfg: BaocaoConfig,
}

/// Builder for constructing a [`Baocao`] engine with custom configuration.
pub struct BaocaoBuilder {
    source: Option<Arc<dyn DocumentSource>>,
    parser: Option<Arc<dyn IntentParser>>,
    channel: Option<Arc<dyn ChoiceChannel>>,
    cfg: BaocaoConfig,
}

impl Default for BaocaoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BaocaoBuilder {
    /// Create a new builder with sensible defaults.
    ///
    /// Behavior and trade-offs:
    /// - A document source is mandatory; register one via [`with_source`].
    /// - The intent parser and choice channel are optional: without a parser
    ///   only [`Baocao::resolve_batch`] is available, and without a channel a
    ///   batch that needs clarification fails instead of suspending forever.
    /// - Defaults are conservative: 30s acquisition timeout, no clarification
    ///   timeout, "today" read from the local clock.
    ///
    /// [`with_source`]: Self::with_source
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            parser: None,
            channel: None,
            cfg: BaocaoConfig::default(),
        }
    }

    /// Register the document source the engine acquires listings from.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn DocumentSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Register the intent parser backing [`Baocao::resolve_query`].
    #[must_use]
    pub fn with_parser(mut self, parser: Arc<dyn IntentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Register the channel asked to settle clarifications.
    #[must_use]
    pub fn with_choice_channel(mut self, channel: Arc<dyn ChoiceChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Bound a single document-source acquisition call.
    ///
    /// The acquisition session is released on every exit path, including the
    /// timeout, before control returns to the queue loop.
    #[must_use]
    pub const fn source_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.source_timeout = timeout;
        self
    }

    /// Bound the wait for a clarification answer.
    ///
    /// When the window elapses the parked request fails with "clarification
    /// timed out" and the batch continues; without a bound the engine waits
    /// for the channel indefinitely.
    #[must_use]
    pub const fn clarification_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.clarification_timeout = Some(timeout);
        self
    }

    /// Pin "today" for future-dated request pruning (used by tests and
    /// replays; the default reads the local clock per run).
    #[must_use]
    pub const fn assume_today(mut self, today: NaiveDate) -> Self {
        self.cfg.today = Some(today);
        self
    }

    /// Build the [`Baocao`] engine.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no document source has been registered.
    pub fn build(self) -> Result<Baocao, BaocaoError> {
        let Some(source) = self.source else {
            return Err(BaocaoError::invalid_arg(
                "no document source registered; add one via with_source(...)",
            ));
        };
        Ok(Baocao {
            source,
            parser: self.parser,
            channel: self.channel,
            cfg: self.cfg,
        })
    }
}

impl Baocao {
    /// Start building a new `Baocao` engine.
    ///
    /// Typical usage chains the collaborators and configuration, e.g.:
    ///
    /// ```rust,ignore
    /// let engine = baocao::Baocao::builder()
    ///     .with_source(Arc::new(VietstockSource::builder().build()?))
    ///     .with_choice_channel(Arc::new(TerminalChannel::new()))
    ///     .source_timeout(Duration::from_secs(45))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> BaocaoBuilder {
        BaocaoBuilder::new()
    }

    /// Create a [`BatchRun`] for `intent`, pruning future-dated requests.
    ///
    /// Requests whose reporting period has not ended by "today" are dropped
    /// before queueing and enumerated in the run's notification.
    #[must_use]
    pub fn start_batch(&self, intent: AnalysisIntent) -> BatchRun {
        let today = self
            .cfg
            .today
            .unwrap_or_else(|| Local::now().date_naive());
        let (ready, skipped) = prune::split_future(intent.requests, today);
        let mut run = BatchRun::new(ready, intent.comparison_context);
        if !skipped.is_empty() {
            let listed = skipped
                .iter()
                .map(prune::describe)
                .collect::<Vec<_>>()
                .join(", ");
            run.set_notification(format!(
                "Skipped requests whose reporting period has not ended yet: {listed}."
            ));
        }
        run
    }

    /// Advance `run` until it parks or finishes, using this engine's source
    /// and acquisition timeout. For callers driving the suspend/resume
    /// protocol themselves (services persisting the run between exchanges).
    pub async fn advance(&self, run: &mut BatchRun) -> Step {
        run.advance(self.source.as_ref(), self.cfg.source_timeout).await
    }

    /// Resolve a whole batch, settling clarifications via the registered
    /// choice channel.
    ///
    /// Out-of-range selections re-issue the same prompt; a channel failure or
    /// an elapsed clarification timeout fails only the parked request and the
    /// batch continues.
    ///
    /// # Errors
    /// Returns `InvalidArg` if a clarification is needed but no choice
    /// channel was registered.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "baocao::core::resolve_batch", skip(self, intent)),
    )]
    pub async fn resolve_batch(&self, intent: AnalysisIntent) -> Result<BatchReport, BaocaoError> {
        let mut run = self.start_batch(intent);
        loop {
            match self.advance(&mut run).await {
                Step::Done => return Ok(run.into_report()),
                Step::AwaitingChoice { prompt, choices } => {
                    let Some(channel) = &self.channel else {
                        return Err(BaocaoError::invalid_arg(
                            "a clarification is pending but no choice channel is registered; \
                             add one via with_choice_channel(...)",
                        ));
                    };
                    loop {
                        let picked = match self.cfg.clarification_timeout {
                            Some(limit) => {
                                (tokio::time::timeout(limit, channel.choose(&prompt, &choices))
                                    .await)
                                    .unwrap_or(Err(BaocaoError::ClarificationTimeout))
                            }
                            None => channel.choose(&prompt, &choices).await,
                        };
                        match picked {
                            Ok(selection) => match run.resume(selection) {
                                Ok(()) => break,
                                Err(BaocaoError::InvalidSelection { .. }) => {
                                    // Re-issue the same prompt; never a batch failure.
                                    continue;
                                }
                                Err(other) => return Err(other),
                            },
                            Err(err) => {
                                run.abandon(&err)?;
                                break;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Parse a free-form query and resolve the resulting batch.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no intent parser was registered, and
    /// propagates a parser failure as a fatal batch error with no partial
    /// results.
    pub async fn resolve_query(&self, query: &str) -> Result<BatchReport, BaocaoError> {
        let Some(parser) = &self.parser else {
            return Err(BaocaoError::invalid_arg(
                "no intent parser registered; add one via with_parser(...)",
            ));
        };
        let intent = parser.parse(query).await?;
        self.resolve_batch(intent).await
    }
}
