use thiserror::Error;

/// Unified error type for the baocao workspace.
///
/// Request-scoped failures (acquisition, empty buckets, exhausted fallback)
/// terminate a single request; `Parse` terminates the whole batch before any
/// request is queued; `InvalidSelection` is local to the clarification gate
/// and is recovered by re-prompting.
#[derive(Debug, Error)]
pub enum BaocaoError {
    /// The document source failed for a reason other than timeout/not-found.
    #[error("{source_name} failed: {msg}")]
    Source {
        /// Name of the source that failed.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The listing page could not be reached in time, or the ticker does not
    /// exist on the source.
    #[error("no listing found for ticker '{stock_code}'; check the code and try again")]
    SourceTimeout {
        /// Ticker the lookup was attempted for.
        stock_code: String,
    },

    /// The source answered with an empty document list.
    #[error("no reports listed for {stock_code}{}", .year.map_or_else(String::new, |y| format!(" in {y}")))]
    NoDocuments {
        /// Ticker the lookup was attempted for.
        stock_code: String,
        /// Year filter in effect, if any.
        year: Option<i32>,
    },

    /// An explicitly constrained bucket held no document.
    #[error("no {what} was found")]
    NoMatch {
        /// Description of the missing bucket, e.g. "quarter 2 consolidated report for FPT in 2024".
        what: String,
    },

    /// The requested quarter and every earlier quarter of the year are empty.
    #[error("no report for quarter {quarter} of {year}, and no earlier quarter of that year has one")]
    ExhaustedFallback {
        /// Quarter originally requested.
        quarter: u8,
        /// Year the search ran over.
        year: i32,
    },

    /// No reporting period produced a candidate at all.
    #[error("no financial report matched for {year}")]
    NoPeriodMatch {
        /// Year the search ran over.
        year: i32,
    },

    /// The intent parser could not turn the query into requests. Fatal for
    /// the batch; nothing is queued.
    #[error("query parsing failed: {0}")]
    Parse(String),

    /// A clarification selection outside `1..=max`. Recoverable; the prompt
    /// is re-issued.
    #[error("selection {given} is out of range; pick a number between 1 and {max}")]
    InvalidSelection {
        /// The rejected 1-based selection.
        given: usize,
        /// Number of choices on offer.
        max: usize,
    },

    /// A parked clarification was never answered within the configured window.
    #[error("clarification timed out")]
    ClarificationTimeout,

    /// The choice channel itself failed to deliver a selection.
    #[error("choice channel failed: {0}")]
    Channel(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}

impl BaocaoError {
    /// Helper: build a `Source` error with the source name and message.
    pub fn source(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `SourceTimeout` error for a ticker.
    pub fn source_timeout(stock_code: impl Into<String>) -> Self {
        Self::SourceTimeout {
            stock_code: stock_code.into(),
        }
    }

    /// Helper: build a `NoMatch` error for a description of the missing bucket.
    pub fn no_match(what: impl Into<String>) -> Self {
        Self::NoMatch { what: what.into() }
    }

    /// Helper: build an `InvalidArg` error.
    pub fn invalid_arg(msg: impl Into<String>) -> Self {
        Self::InvalidArg(msg.into())
    }
}
