use std::fmt;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::BaocaoError;
use crate::grid::PeriodKey;

/// Opaque identifier joining a [`ReportRequest`] to its collected outcome.
///
/// Generated when a request is created without one (including during
/// deserialization) and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wrap an externally supplied identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier of the form `req_` + 8 hex chars.
    #[must_use]
    pub fn generate() -> Self {
        let mut hex = Uuid::new_v4().simple().to_string();
        hex.truncate(8);
        Self(format!("req_{hex}"))
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reporting period a request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportPeriod {
    /// A single quarter; the request must carry `quarter` in `1..=4`.
    Quarter,
    /// The reviewed half-year report.
    HalfYear,
    /// The audited full-year report.
    FullYear,
    /// Whatever the source lists first, with no year constraint.
    Latest,
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Quarter => "quarterly",
            Self::HalfYear => "half-year",
            Self::FullYear => "full-year",
            Self::Latest => "latest",
        };
        f.write_str(label)
    }
}

/// Whether a report covers the parent company alone or the consolidated group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Consolidation {
    /// Parent plus subsidiaries combined.
    Consolidated,
    /// Parent company alone. The default when a title carries no marker.
    ParentOnly,
}

impl Consolidation {
    /// Both statuses in the fixed priority order used by the fallback search.
    pub const ALL: [Self; 2] = [Self::Consolidated, Self::ParentOnly];

    /// The lower-cased title marker the source uses for this status.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Consolidated => "hợp nhất",
            Self::ParentOnly => "công ty mẹ",
        }
    }
}

impl fmt::Display for Consolidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Consolidated => "consolidated",
            Self::ParentOnly => "parent-only",
        };
        f.write_str(label)
    }
}

/// One unit of work: find the document link for a ticker and fiscal period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Sole join key between this request and its collected outcome.
    #[serde(default = "RequestId::generate")]
    pub request_id: RequestId,
    /// Ticker symbol. Case-insensitive; normalized to upper case at use.
    pub stock_code: String,
    /// Fiscal year. Absent only when `period` is [`ReportPeriod::Latest`].
    #[serde(default)]
    pub year: Option<i32>,
    /// Requested reporting period.
    pub period: ReportPeriod,
    /// Quarter in `1..=4`, required iff `period` is [`ReportPeriod::Quarter`].
    #[serde(default)]
    pub quarter: Option<u8>,
    /// Explicit consolidation constraint; absent lets the policy decide or ask.
    #[serde(default)]
    pub consolidation: Option<Consolidation>,
}

impl ReportRequest {
    /// Create a request with a generated [`RequestId`].
    pub fn new(stock_code: impl Into<String>, period: ReportPeriod) -> Self {
        Self {
            request_id: RequestId::generate(),
            stock_code: stock_code.into(),
            year: None,
            period,
            quarter: None,
            consolidation: None,
        }
    }

    /// Shortcut for a [`ReportPeriod::Latest`] request.
    pub fn latest(stock_code: impl Into<String>) -> Self {
        Self::new(stock_code, ReportPeriod::Latest)
    }

    /// Replace the generated identifier.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Set the fiscal year.
    #[must_use]
    pub const fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the quarter for a [`ReportPeriod::Quarter`] request.
    #[must_use]
    pub const fn with_quarter(mut self, quarter: u8) -> Self {
        self.quarter = Some(quarter);
        self
    }

    /// Pin the consolidation status as a hard constraint.
    #[must_use]
    pub const fn with_consolidation(mut self, consolidation: Consolidation) -> Self {
        self.consolidation = Some(consolidation);
        self
    }

    /// Ticker normalized to upper case.
    #[must_use]
    pub fn normalized_code(&self) -> String {
        self.stock_code.to_uppercase()
    }

    /// Check the field invariants: a quarter in `1..=4` exactly when the
    /// period is quarterly, and a year for every period except `Latest`.
    ///
    /// # Errors
    /// Returns `InvalidArg` naming the violated rule.
    pub fn validate(&self) -> Result<(), BaocaoError> {
        if self.period == ReportPeriod::Quarter {
            match self.quarter {
                Some(1..=4) => {}
                Some(other) => {
                    return Err(BaocaoError::invalid_arg(format!(
                        "quarter must be between 1 and 4, got {other}"
                    )));
                }
                None => {
                    return Err(BaocaoError::invalid_arg(
                        "a quarter between 1 and 4 is required for quarterly requests",
                    ));
                }
            }
        }
        if self.period != ReportPeriod::Latest && self.year.is_none() {
            return Err(BaocaoError::invalid_arg(format!(
                "a year is required for {} requests",
                self.period
            )));
        }
        Ok(())
    }
}

/// One scraped document reference. Produced fresh per fetch, never mutated,
/// never deduplicated; source order is treated as most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Listing title, used only for classification and display.
    pub title: String,
    /// Absolute URL of the document.
    pub link: String,
}

impl ReportDocument {
    /// Create a document reference.
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// One clarification candidate offered to the external actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportChoice {
    /// Period bucket the candidate was drawn from.
    pub period: PeriodKey,
    /// Consolidation bucket the candidate was drawn from.
    pub consolidation: Consolidation,
    /// Listing title, shown in the numbered prompt.
    pub title: String,
    /// Absolute URL selected when this choice is picked.
    pub link: String,
}

/// Result of resolving one request against its classification grid.
#[derive(Debug)]
pub enum ResolutionOutcome {
    /// A unique link was decided.
    Resolved {
        /// The selected document link.
        link: String,
        /// Optional note about how the link was chosen (default pick,
        /// auto-selected sole candidate, missing requested quarter).
        notification: Option<String>,
    },
    /// The policy narrowed the candidates to a short list but cannot decide.
    NeedsClarification {
        /// Numbered, 1-based prompt listing each choice's title.
        prompt: String,
        /// Candidates in presentation order; a selection of `k` resolves to
        /// `choices[k - 1]`.
        choices: Vec<ReportChoice>,
    },
    /// Resolution terminated without a link.
    Failed(BaocaoError),
}

/// Parsed user intent: the requests to resolve plus the textual objective.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisIntent {
    /// Ordered list of report requests.
    pub requests: Vec<ReportRequest>,
    /// Free-text description of what the user wants to do with the reports.
    pub comparison_context: String,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct BaocaoConfig {
    /// Bound on a single document-source acquisition call.
    pub source_timeout: Duration,
    /// Bound on waiting for a clarification answer; `None` waits forever.
    pub clarification_timeout: Option<Duration>,
    /// Pinned "today" for future-dated request pruning; `None` uses the
    /// local date at run time.
    pub today: Option<NaiveDate>,
}

impl Default for BaocaoConfig {
    fn default() -> Self {
        Self {
            source_timeout: Duration::from_secs(30),
            clarification_timeout: None,
            today: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_prefix_and_do_not_collide() {
        let ids: std::collections::HashSet<String> = (0..200)
            .map(|_| RequestId::generate().as_str().to_string())
            .collect();
        assert_eq!(ids.len(), 200);
        assert!(ids.iter().all(|id| id.starts_with("req_") && id.len() == 12));
    }

    #[test]
    fn validate_requires_quarter_for_quarterly_requests() {
        let req = ReportRequest::new("fpt", ReportPeriod::Quarter).with_year(2024);
        assert!(req.validate().is_err());
        assert!(req.with_quarter(2).validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_quarter() {
        let req = ReportRequest::new("FPT", ReportPeriod::Quarter)
            .with_year(2024)
            .with_quarter(5);
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("between 1 and 4"));
    }

    #[test]
    fn validate_requires_year_except_for_latest() {
        assert!(
            ReportRequest::new("FPT", ReportPeriod::FullYear)
                .validate()
                .is_err()
        );
        assert!(ReportRequest::latest("FPT").validate().is_ok());
    }

    #[test]
    fn missing_request_id_is_generated_on_deserialize() {
        let req: ReportRequest =
            serde_json::from_str(r#"{"stock_code":"FPT","year":2024,"period":"FullYear"}"#)
                .expect("deserializes");
        assert!(req.request_id.as_str().starts_with("req_"));
        assert_eq!(req.period, ReportPeriod::FullYear);
    }

    #[test]
    fn normalized_code_uppercases() {
        assert_eq!(ReportRequest::latest("fpt").normalized_code(), "FPT");
    }
}
