//! baocao-core
//!
//! Core types, source traits, and the classification grid shared across the
//! baocao ecosystem.
//!
//! - `types`: requests, documents, clarification choices, and configuration.
//! - `grid`: the fixed `(PeriodKey, Consolidation)` table and [`classify`].
//! - `report`: collected outcomes and the batch report rendering.
//! - `source`: the narrow traits external collaborators implement
//!   ([`DocumentSource`], [`IntentParser`], [`ChoiceChannel`]).
//!
//! The traits are `async_trait` object-safe interfaces and assume the Tokio
//! ecosystem as the async runtime, matching the engine crate.
#![warn(missing_docs)]

/// Unified error taxonomy for the workspace.
pub mod error;
/// The classification grid and the title-inference rules that fill it.
pub mod grid;
/// Collected outcomes and the final batch report.
pub mod report;
/// Traits implemented by external collaborators.
pub mod source;
/// Requests, documents, choices, outcomes, and configuration.
pub mod types;

pub use error::BaocaoError;
pub use grid::{PeriodKey, ReportGrid, classify};
pub use report::{BatchReport, CollectedOutcome};
pub use source::{ChoiceChannel, DocumentSource, IntentParser};
pub use types::{
    AnalysisIntent, BaocaoConfig, Consolidation, ReportChoice, ReportDocument, ReportPeriod,
    ReportRequest, RequestId, ResolutionOutcome,
};
