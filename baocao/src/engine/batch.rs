use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use baocao_core::{
    BaocaoError, BatchReport, CollectedOutcome, DocumentSource, ReportChoice, ReportPeriod,
    ReportRequest, RequestId, ResolutionOutcome, classify,
};

use super::policy;

/// Where the state machine stands between [`BatchRun::advance`] calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
enum Phase {
    /// Ready to pop the next pending request.
    Idle,
    /// Parked on a clarification; only `resume` or `abandon` move it.
    AwaitingChoice {
        prompt: String,
        choices: Vec<ReportChoice>,
    },
    /// The queue is drained and every request has a collected outcome.
    Done,
}

/// What [`BatchRun::advance`] returned control for.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The run is parked on a clarification. Present `prompt` to the external
    /// actor and feed the 1-based selection to [`BatchRun::resume`].
    AwaitingChoice {
        /// Numbered prompt listing each choice's title.
        prompt: String,
        /// Candidates in presentation order.
        choices: Vec<ReportChoice>,
    },
    /// The batch is finished; collect the report via [`BatchRun::into_report`].
    Done,
}

/// One batch run: the pending queue, the request in flight, and the outcomes
/// collected so far.
///
/// Owned exclusively by its driver for the duration of the run; no component
/// retains a reference across calls. The run serializes, so a service
/// deployment can persist it while parked on a clarification and resume it in
/// a later exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRun {
    pending: VecDeque<ReportRequest>,
    current: Option<ReportRequest>,
    phase: Phase,
    collected: HashMap<RequestId, CollectedOutcome>,
    comparison_context: String,
    notification: Option<String>,
}

impl BatchRun {
    /// Create a run over `requests`, processed in order.
    pub fn new(
        requests: impl IntoIterator<Item = ReportRequest>,
        comparison_context: impl Into<String>,
    ) -> Self {
        Self {
            pending: requests.into_iter().collect(),
            current: None,
            phase: Phase::Idle,
            collected: HashMap::new(),
            comparison_context: comparison_context.into(),
            notification: None,
        }
    }

    /// Attach the cross-cutting status message carried into the report.
    pub fn set_notification(&mut self, notification: impl Into<String>) {
        self.notification = Some(notification.into());
    }

    /// Drive the queue until it drains or a clarification parks it.
    ///
    /// Each iteration pops the head request, acquires its listing from
    /// `source` (bounded by `source_timeout`), classifies, and resolves.
    /// Failures are collected and the loop continues; a `NeedsClarification`
    /// outcome parks the run and returns. Calling `advance` on a parked run
    /// returns the same [`Step::AwaitingChoice`] again without side effects.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "baocao::engine::advance",
            skip(self, source),
            fields(source = source.name(), pending = self.pending.len()),
        )
    )]
    pub async fn advance(&mut self, source: &dyn DocumentSource, source_timeout: Duration) -> Step {
        loop {
            match &self.phase {
                Phase::AwaitingChoice { prompt, choices } => {
                    return Step::AwaitingChoice {
                        prompt: prompt.clone(),
                        choices: choices.clone(),
                    };
                }
                Phase::Done => return Step::Done,
                Phase::Idle => {}
            }

            let Some(request) = self.pending.pop_front() else {
                self.phase = Phase::Done;
                return Step::Done;
            };
            #[cfg(feature = "tracing")]
            tracing::debug!(
                request_id = %request.request_id,
                stock_code = %request.stock_code,
                period = %request.period,
                "resolving request"
            );
            self.current = Some(request.clone());

            match Self::resolve_one(&request, source, source_timeout).await {
                ResolutionOutcome::Resolved { link, notification } => {
                    #[cfg(feature = "tracing")]
                    if let Some(note) = &notification {
                        tracing::info!(request_id = %request.request_id, "{note}");
                    }
                    let _ = notification;
                    self.collect(request.request_id, CollectedOutcome::Resolved { link });
                }
                ResolutionOutcome::NeedsClarification { prompt, choices } => {
                    self.phase = Phase::AwaitingChoice {
                        prompt: prompt.clone(),
                        choices: choices.clone(),
                    };
                    return Step::AwaitingChoice { prompt, choices };
                }
                ResolutionOutcome::Failed(err) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(request_id = %request.request_id, error = %err, "request failed");
                    self.collect(
                        request.request_id,
                        CollectedOutcome::Failed {
                            reason: err.to_string(),
                        },
                    );
                }
            }
        }
    }

    /// Answer a pending clarification with a 1-based selection.
    ///
    /// The selected choice's link is collected for the parked request and the
    /// run returns to `Idle`, ready for the next [`advance`](Self::advance).
    ///
    /// # Errors
    /// `InvalidSelection` when `selection` is outside `1..=choices.len()`;
    /// the run is left unchanged so the prompt can be re-issued. `InvalidArg`
    /// when no clarification is pending.
    pub fn resume(&mut self, selection: usize) -> Result<(), BaocaoError> {
        let Phase::AwaitingChoice { choices, .. } = &self.phase else {
            return Err(BaocaoError::invalid_arg("no clarification is pending"));
        };
        if selection == 0 || selection > choices.len() {
            return Err(BaocaoError::InvalidSelection {
                given: selection,
                max: choices.len(),
            });
        }
        let link = choices[selection - 1].link.clone();
        let Some(request) = self.current.take() else {
            return Err(BaocaoError::invalid_arg(
                "no request is awaiting clarification",
            ));
        };
        self.collect(request.request_id, CollectedOutcome::Resolved { link });
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Give up on a pending clarification, recording the parked request as
    /// failed with `reason`, and return the run to `Idle`.
    ///
    /// # Errors
    /// `InvalidArg` when no clarification is pending.
    pub fn abandon(&mut self, reason: &BaocaoError) -> Result<(), BaocaoError> {
        if !matches!(self.phase, Phase::AwaitingChoice { .. }) {
            return Err(BaocaoError::invalid_arg("no clarification is pending"));
        }
        let Some(request) = self.current.take() else {
            return Err(BaocaoError::invalid_arg(
                "no request is awaiting clarification",
            ));
        };
        self.collect(
            request.request_id,
            CollectedOutcome::Failed {
                reason: reason.to_string(),
            },
        );
        self.phase = Phase::Idle;
        Ok(())
    }

    /// Whether the queue is drained and every outcome collected.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }

    /// Prompt of the pending clarification, if the run is parked.
    #[must_use]
    pub fn prompt(&self) -> Option<&str> {
        match &self.phase {
            Phase::AwaitingChoice { prompt, .. } => Some(prompt),
            _ => None,
        }
    }

    /// Choices of the pending clarification, if the run is parked.
    #[must_use]
    pub fn choices(&self) -> Option<&[ReportChoice]> {
        match &self.phase {
            Phase::AwaitingChoice { choices, .. } => Some(choices),
            _ => None,
        }
    }

    /// The request presently being resolved, if any.
    #[must_use]
    pub fn current(&self) -> Option<&ReportRequest> {
        self.current.as_ref()
    }

    /// Number of requests still waiting in the queue.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Outcomes collected so far, keyed by request identifier.
    #[must_use]
    pub const fn collected(&self) -> &HashMap<RequestId, CollectedOutcome> {
        &self.collected
    }

    /// Consume the run into its final [`BatchReport`].
    #[must_use]
    pub fn into_report(self) -> BatchReport {
        BatchReport {
            comparison_context: self.comparison_context,
            notification: self.notification,
            collected: self.collected,
        }
    }

    fn collect(&mut self, request_id: RequestId, outcome: CollectedOutcome) {
        self.collected.insert(request_id, outcome);
        self.current = None;
    }

    /// Acquire, classify, and resolve a single request.
    ///
    /// The year constraint is dropped for `Latest` requests; the fetch still
    /// happens. The acquisition is bounded so a hung source session is
    /// released before control returns to the queue loop.
    async fn resolve_one(
        request: &ReportRequest,
        source: &dyn DocumentSource,
        source_timeout: Duration,
    ) -> ResolutionOutcome {
        if let Err(err) = request.validate() {
            return ResolutionOutcome::Failed(err);
        }
        let code = request.normalized_code();
        let year = if request.period == ReportPeriod::Latest {
            None
        } else {
            request.year
        };

        let fetched = (tokio::time::timeout(source_timeout, source.fetch(&code, year)).await)
            .unwrap_or_else(|_| Err(BaocaoError::source_timeout(&code)));
        let documents = match fetched {
            Ok(documents) => documents,
            Err(err) => return ResolutionOutcome::Failed(err),
        };
        if documents.is_empty() {
            return ResolutionOutcome::Failed(BaocaoError::NoDocuments {
                stock_code: code,
                year,
            });
        }

        let grid = classify(&documents);
        policy::resolve(request, &grid, &documents)
    }
}
