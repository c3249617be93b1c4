use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::RequestId;

const GENERIC_FAILURE: &str =
    "Unfortunately the request could not be processed. Please try again with a different query.";

/// Terminated outcome of one request. A present key in
/// [`BatchReport::collected`] always means resolution finished, successfully
/// or not; there is no pending state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectedOutcome {
    /// Resolution produced a unique document link.
    Resolved {
        /// The selected document link.
        link: String,
    },
    /// Resolution terminated without a link.
    Failed {
        /// Human-readable failure reason.
        reason: String,
    },
}

impl CollectedOutcome {
    /// Whether this outcome records a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// The finished state of one batch run, handed to the response formatter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Textual objective carried through unchanged from the intent parser.
    pub comparison_context: String,
    /// Cross-cutting status message, e.g. future-dated requests skipped.
    pub notification: Option<String>,
    /// One terminated outcome per request, keyed by request identifier.
    pub collected: HashMap<RequestId, CollectedOutcome>,
}

impl BatchReport {
    /// Render the run as one text block.
    ///
    /// An empty run with a notification yields the notification alone; a run
    /// with nothing at all yields a fixed generic failure line. Otherwise the
    /// objective, the notification (if any), and one line per collected entry
    /// are concatenated, sorted by request id for stable output, with
    /// failures carrying an `ERROR:` tag.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.collected.is_empty() {
            return self.notification.as_ref().map_or_else(
                || GENERIC_FAILURE.to_string(),
                |note| format!("Objective: {}\n\nStatus:\n{note}", self.comparison_context),
            );
        }

        let mut parts = vec![format!("Analysis objective: {}", self.comparison_context)];
        if let Some(note) = &self.notification {
            parts.push(format!("\nNotice:\n{note}"));
        }
        parts.push("\nResults:".to_string());

        let mut entries: Vec<_> = self.collected.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (id, outcome) in entries {
            match outcome {
                CollectedOutcome::Resolved { link } => {
                    parts.push(format!("Request {id}: success. Link: {link}"));
                }
                CollectedOutcome::Failed { reason } => {
                    parts.push(format!("Request {id}: failed. ERROR: {reason}"));
                }
            }
        }
        parts.join("\n")
    }
}
