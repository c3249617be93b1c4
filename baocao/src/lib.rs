//! Baocao resolves batches of financial report requests to document links.
//!
//! Overview
//! - Drives a FIFO queue of [`ReportRequest`]s through acquisition,
//!   classification, and a deterministic resolution policy, one request at a
//!   time.
//! - Buckets scraped listings into a fixed `(period, consolidation)` grid and
//!   applies a backward-in-time fallback when the requested period is empty.
//! - Suspends into an explicit [`Step::AwaitingChoice`] state when the policy
//!   narrows to a short list it cannot decide, and resumes on a 1-based
//!   selection, so the engine runs equally well under a CLI loop or a
//!   request/response service that persists the parked [`BatchRun`].
//! - Isolates per-request failures: one failed acquisition or empty bucket is
//!   recorded and the batch moves on; only an intent-parser failure aborts a
//!   run before anything is queued.
//!
//! Key behaviors and trade-offs
//! - Requests are processed strictly sequentially because each acquisition
//!   holds an exclusive source session; there is no per-batch parallelism.
//! - An explicit consolidation status is a hard constraint: an empty bucket
//!   fails the request without any fallback search. An unset status falls
//!   back and may ask. The asymmetry follows the upstream product behavior.
//! - The quarter fallback walks strictly backward and stops at the first
//!   non-empty quarter, so a request for a missing quarter offers the nearest
//!   completed period instead of an unbounded list.
//!
//! Resolving a batch end to end:
//! ```rust,ignore
//! use std::sync::Arc;
//! use baocao::Baocao;
//! use baocao_core::{AnalysisIntent, ReportPeriod, ReportRequest};
//!
//! let engine = Baocao::builder()
//!     .with_source(Arc::new(source))
//!     .with_choice_channel(Arc::new(channel))
//!     .build()?;
//!
//! let intent = AnalysisIntent {
//!     requests: vec![
//!         ReportRequest::new("FPT", ReportPeriod::Quarter)
//!             .with_year(2024)
//!             .with_quarter(2),
//!     ],
//!     comparison_context: "Review FPT's Q2 2024 results.".to_string(),
//! };
//! let report = engine.resolve_batch(intent).await?;
//! println!("{}", report.summary());
//! ```
//!
//! Driving the suspend/resume protocol manually:
//! ```rust,ignore
//! use baocao::Step;
//!
//! let mut run = engine.start_batch(intent);
//! loop {
//!     match engine.advance(&mut run).await {
//!         Step::Done => break,
//!         Step::AwaitingChoice { prompt, choices } => {
//!             println!("{prompt}");
//!             run.resume(read_selection())?;
//!         }
//!     }
//! }
//! let report = run.into_report();
//! ```
//!
//! See `baocao/examples/` for runnable end-to-end demonstrations.
#![warn(missing_docs)]

pub(crate) mod core;
/// The request resolution engine: batch state machine and policy.
pub mod engine;

pub use core::{Baocao, BaocaoBuilder};
pub use engine::batch::{BatchRun, Step};

// Re-export core types for convenience
pub use baocao_core::{
    AnalysisIntent,
    BaocaoConfig,
    BaocaoError,
    BatchReport,
    ChoiceChannel,
    CollectedOutcome,
    Consolidation,
    DocumentSource,
    IntentParser,
    PeriodKey,
    ReportChoice,
    ReportDocument,
    ReportGrid,
    ReportPeriod,
    ReportRequest,
    RequestId,
    ResolutionOutcome,
    classify,
};
